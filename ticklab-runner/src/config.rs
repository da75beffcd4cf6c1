//! Serializable backtest configuration.
//!
//! A config names the instrument, where its quotes live, the strategy and the
//! cost model. It is loaded from TOML:
//!
//! ```toml
//! [backtest]
//! symbol = "GOOG"
//! data_dir = "quotes"
//! cache_dir = "cache"
//!
//! [strategy]
//! type = "bollinger"
//! period = 30
//! width = 1.0
//!
//! [cost]
//! type = "percent"
//! percent = 0.5
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ticklab_core::{
    BollingerStrategy, CostModel, FixedPlusPercent, Monkey, PercentOfNotional, Strategy, ZeroCost,
};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete, reproducible description of one backtest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub cost: CostConfig,
}

/// Instrument and quote locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    pub symbol: String,
    /// Directory holding `{SYMBOL}.csv` quote files.
    pub data_dir: PathBuf,
    /// Directory for dated quote caches.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Band breakout: buy above the upper band, sell below the lower band.
    Bollinger { period: usize, width: f64 },

    /// Random baseline. Without a seed every run differs.
    Monkey {
        frequency: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

/// Per-trade cost model selection (serializable enum).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostConfig {
    #[default]
    Zero,

    /// Percentage of notional.
    Percent { percent: f64 },

    /// Fixed ticket charge plus a percentage of notional.
    FixedPlusPercent { fixed: f64, percent: f64 },
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        self.strategy.validate()?;
        self.cost.validate()
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two identical configs share a RunId, so their artifacts land in the
    /// same directory.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serializes to JSON");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex().as_str()[..16].to_string()
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Bollinger { period, width } => {
                if period == 0 {
                    return Err(ConfigError::Invalid("bollinger period must be >= 1".into()));
                }
                check_non_negative("bollinger width", width)
            }
            Self::Monkey { frequency, .. } => {
                if frequency == 0 {
                    return Err(ConfigError::Invalid("monkey frequency must be >= 1".into()));
                }
                Ok(())
            }
        }
    }

    /// Instantiate the strategy. Call [`StrategyConfig::validate`] first;
    /// zero periods and frequencies panic in the strategy constructors.
    pub fn build(&self) -> Box<dyn Strategy + Send> {
        match *self {
            Self::Bollinger { period, width } => Box::new(BollingerStrategy::new(period, width)),
            Self::Monkey {
                frequency,
                seed: Some(seed),
            } => Box::new(Monkey::seeded(frequency, seed)),
            Self::Monkey {
                frequency,
                seed: None,
            } => Box::new(Monkey::new(frequency)),
        }
    }
}

impl CostConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Zero => Ok(()),
            Self::Percent { percent } => check_non_negative("cost percent", percent),
            Self::FixedPlusPercent { fixed, percent } => {
                check_non_negative("cost fixed", fixed)?;
                check_non_negative("cost percent", percent)
            }
        }
    }

    pub fn build(&self) -> Box<dyn CostModel + Send + Sync> {
        match *self {
            Self::Zero => Box::new(ZeroCost),
            Self::Percent { percent } => Box::new(PercentOfNotional::new(percent)),
            Self::FixedPlusPercent { fixed, percent } => {
                Box::new(FixedPlusPercent::new(fixed, percent))
            }
        }
    }
}

fn check_non_negative(what: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{what} must be finite and >= 0, got {value}"
        )))
    }
}
