//! TickLab CLI: run, sweep, and cache management commands.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file or command-line flags
//! - `sweep`: rank a grid of Bollinger (period, width) pairs by net PnL
//! - `cache status`: list cached quote files
//! - `cache clean`: remove cache files older than a number of days

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use ticklab_runner::{
    load_series, run_from_config, run_sweep, save_artifacts, BacktestConfig, BacktestResult,
    BacktestSection, BollingerGrid, CostConfig, CsvDirSource, QuoteCache, StrategyConfig,
};

/// Flags that describe a run inline and so cannot be combined with `--config`.
const RUN_FLAGS: [&str; 10] = [
    "symbol",
    "data_dir",
    "cache_dir",
    "cost_pct",
    "cost_fixed",
    "strategy",
    "period",
    "width",
    "frequency",
    "seed",
];

#[derive(Parser)]
#[command(
    name = "ticklab",
    about = "TickLab CLI: daily-bar strategy backtester"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or flags.
    Run {
        /// Path to a TOML config file. Excludes the flags below.
        #[arg(long, conflicts_with_all = RUN_FLAGS)]
        config: Option<PathBuf>,

        #[command(flatten)]
        market: MarketArgs,

        /// Strategy to run.
        #[arg(long, value_enum, default_value_t = StrategyKind::Bollinger)]
        strategy: StrategyKind,

        /// Bollinger window length.
        #[arg(long, default_value_t = 30)]
        period: usize,

        /// Bollinger band width in standard deviations.
        #[arg(long, default_value_t = 1.0)]
        width: f64,

        /// Monkey decision frequency in ticks.
        #[arg(long, default_value_t = 30)]
        frequency: usize,

        /// Monkey RNG seed. Omit for a different run every time.
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Rank Bollinger (period, width) pairs by net PnL.
    Sweep {
        #[command(flatten)]
        market: MarketArgs,

        /// Comma-separated window lengths.
        #[arg(long, value_delimiter = ',', default_values_t = vec![10, 20, 30, 40, 50])]
        periods: Vec<usize>,

        /// Comma-separated band widths.
        #[arg(long, value_delimiter = ',', default_values_t = vec![1.0, 1.5, 2.0])]
        widths: Vec<f64>,

        /// Show only the best N results.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Where quotes come from and what they cost to trade.
#[derive(clap::Args)]
struct MarketArgs {
    /// Symbol (e.g., GOOG). Quotes are read from `{data_dir}/{SYMBOL}.csv`.
    #[arg(long)]
    symbol: Option<String>,

    /// Directory of newest-first quote CSVs.
    #[arg(long, default_value = "quotes")]
    data_dir: PathBuf,

    /// Cache directory.
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Trading cost as a percentage of each trade's notional.
    #[arg(long)]
    cost_pct: Option<f64>,

    /// Fixed charge per trade, added to --cost-pct.
    #[arg(long)]
    cost_fixed: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    Bollinger,
    Monkey,
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached quote files.
    Status {
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
    /// Remove cache files older than the given number of days.
    Clean {
        /// Keep files from this many most recent days (0 keeps only today).
        #[arg(long, default_value_t = 0)]
        keep_days: u64,

        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            market,
            strategy,
            period,
            width,
            frequency,
            seed,
            output_dir,
        } => {
            let config = match config {
                Some(path) => BacktestConfig::from_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => {
                    let strategy = match strategy {
                        StrategyKind::Bollinger => StrategyConfig::Bollinger { period, width },
                        StrategyKind::Monkey => StrategyConfig::Monkey { frequency, seed },
                    };
                    config_from_args(&market, strategy)?
                }
            };
            run_cmd(&config, &output_dir)
        }
        Commands::Sweep {
            market,
            periods,
            widths,
            top,
        } => {
            let base = config_from_args(
                &market,
                StrategyConfig::Bollinger {
                    period: 30,
                    width: 1.0,
                },
            )?;
            sweep_cmd(&base, BollingerGrid { periods, widths }, top)
        }
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => cache_status_cmd(&cache_dir),
            CacheAction::Clean {
                keep_days,
                cache_dir,
                confirm,
            } => cache_clean_cmd(&cache_dir, keep_days, confirm),
        },
    }
}

/// Stderr logging. `RUST_LOG` wins; otherwise info, or debug with --verbose.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "ticklab=debug,ticklab_core=debug,ticklab_runner=debug"
    } else {
        "ticklab=info,ticklab_core=info,ticklab_runner=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn config_from_args(market: &MarketArgs, strategy: StrategyConfig) -> Result<BacktestConfig> {
    let Some(symbol) = market.symbol.clone() else {
        bail!("one of --config or --symbol is required");
    };
    let cost = match (market.cost_fixed, market.cost_pct) {
        (None, None) => CostConfig::Zero,
        (None, Some(percent)) => CostConfig::Percent { percent },
        (Some(fixed), percent) => CostConfig::FixedPlusPercent {
            fixed,
            percent: percent.unwrap_or(0.0),
        },
    };
    let config = BacktestConfig {
        backtest: BacktestSection {
            symbol,
            data_dir: market.data_dir.clone(),
            cache_dir: market.cache_dir.clone(),
        },
        strategy,
        cost,
    };
    config.validate()?;
    Ok(config)
}

fn run_cmd(config: &BacktestConfig, output_dir: &Path) -> Result<()> {
    let result = run_from_config(config, today())?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let s = &result.summary;
    println!();
    println!("=== {} | {} ===", result.symbol, result.strategy);
    println!(
        "Period:   {} to {} ({} points)",
        result.first_date, result.last_date, result.points
    );
    println!("Cost:     {}", result.cost_model);
    println!("Trades:   {}", s.trades);
    println!("Position: {}", s.position);
    println!("Gross:    {:.2}", s.gross);
    println!("Costs:    {:.2}", s.cost);
    println!("Net:      {:.2}", s.net);
    println!("Passive:  {:.2}", s.passive);
    println!();
}

fn sweep_cmd(base: &BacktestConfig, grid: BollingerGrid, top: usize) -> Result<()> {
    if grid.size() == 0 {
        bail!("empty grid: need at least one period and one width");
    }
    let source = CsvDirSource::new(&base.backtest.data_dir);
    let cache = QuoteCache::new(&base.backtest.cache_dir);
    let series = load_series(&base.backtest.symbol, &source, &cache, today())?;

    info!(runs = grid.size(), "sweeping");
    let results = run_sweep(&grid, base, &series)?;

    println!();
    println!(
        "{:<4} {:>6} {:>6} {:>7} {:>10} {:>10} {:>10}",
        "Rank", "Period", "Width", "Trades", "Gross", "Net", "Passive"
    );
    println!("{}", "-".repeat(59));
    for (rank, result) in results.top_n(top).iter().enumerate() {
        let (period, width) = match result.config.strategy {
            StrategyConfig::Bollinger { period, width } => (period, width),
            StrategyConfig::Monkey { .. } => continue,
        };
        let s = &result.summary;
        println!(
            "{:<4} {:>6} {:>6} {:>7} {:>10.2} {:>10.2} {:>10.2}",
            rank + 1,
            period,
            width,
            s.trades,
            s.gross,
            s.net,
            s.passive
        );
    }
    Ok(())
}

fn cache_status_cmd(cache_dir: &Path) -> Result<()> {
    let entries = QuoteCache::new(cache_dir).status()?;
    if entries.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let total: u64 = entries.iter().map(|e| e.bytes).sum();
    println!("Cache: {}", cache_dir.display());
    println!("Files: {}", entries.len());
    println!("Total size: {}", format_size(total));
    println!();
    println!("{:<10} {:<12} {:>10}", "Symbol", "Day", "Size");
    println!("{}", "-".repeat(34));
    for e in &entries {
        println!("{:<10} {:<12} {:>10}", e.symbol, e.day, format_size(e.bytes));
    }
    Ok(())
}

/// Oldest day kept by `cache clean`. Windows reaching past the calendar keep everything.
fn clean_cutoff(today: NaiveDate, keep_days: u64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(keep_days))
        .unwrap_or(NaiveDate::MIN)
}

fn cache_clean_cmd(cache_dir: &Path, keep_days: u64, confirm: bool) -> Result<()> {
    let cutoff = clean_cutoff(today(), keep_days);
    let stale: Vec<_> = QuoteCache::new(cache_dir)
        .status()?
        .into_iter()
        .filter(|e| e.day < cutoff)
        .collect();

    if stale.is_empty() {
        println!("Nothing to remove (cutoff {cutoff}).");
        return Ok(());
    }
    for e in &stale {
        if confirm {
            std::fs::remove_file(&e.path)
                .with_context(|| format!("failed to remove {}", e.path.display()))?;
            println!("Removed {}", e.path.display());
        } else {
            println!("Would remove {}", e.path.display());
        }
    }
    if !confirm {
        println!("Re-run with --confirm to delete {} file(s).", stale.len());
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
