//! Quote loading and the dated quote cache.
//!
//! Given a symbol, resolves its raw quotes and builds a `PriceSeries`:
//! 1. If today's cache file exists and parses → use it
//! 2. Otherwise fetch from the quote source and write today's cache file
//! 3. Cast, reverse and index the records into a series
//!
//! Raw records stay in the provider's newest-first layout on disk; ordering
//! is only fixed when the series is built.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use ticklab_core::{DataError, PriceSeries, RawQuote};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no quotes for '{symbol}' at {}", path.display())]
    SourceMissing { symbol: String, path: PathBuf },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Where raw quotes come from.
///
/// Implementations return records newest first, exactly as the provider
/// delivers them.
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self, symbol: &str) -> Result<Vec<RawQuote>, LoadError>;
}

/// Quote source backed by a directory of `{SYMBOL}.csv` files.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl QuoteSource for CsvDirSource {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(&self, symbol: &str) -> Result<Vec<RawQuote>, LoadError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(LoadError::SourceMissing {
                symbol: symbol.to_string(),
                path,
            });
        }
        read_raw_csv(&path)
    }
}

/// Read raw records from a CSV file in the provider layout.
pub fn read_raw_csv(path: &Path) -> Result<Vec<RawQuote>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<RawQuote>, _>>()
        .map_err(csv_err)
}

/// Write raw records to a CSV file in the provider layout.
pub fn write_raw_csv(path: &Path, raw: &[RawQuote]) -> Result<(), LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for record in raw {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One cache file as reported by [`QuoteCache::status`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub symbol: String,
    pub day: NaiveDate,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Per-symbol, per-day quote cache: `{dir}/{SYMBOL}_{YYYY-MM-DD}.csv`.
///
/// A file is valid only for the day in its name, so quotes are fetched at
/// most once per symbol per day.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    dir: PathBuf,
}

impl QuoteCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("{symbol}_{}.csv", day.format("%Y-%m-%d")))
    }

    /// Cached records for `symbol` on `day`, or `None` when missing.
    ///
    /// An unreadable cache file counts as a miss.
    pub fn get(&self, symbol: &str, day: NaiveDate) -> Option<Vec<RawQuote>> {
        let path = self.path_for(symbol, day);
        if !path.exists() {
            debug!(symbol, %day, "cache miss");
            return None;
        }
        match read_raw_csv(&path) {
            Ok(raw) if !raw.is_empty() => {
                debug!(symbol, %day, rows = raw.len(), "cache hit");
                Some(raw)
            }
            Ok(_) => {
                warn!(path = %path.display(), "ignoring empty cache file");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache file");
                None
            }
        }
    }

    /// Store records for `symbol` on `day`.
    ///
    /// Writes to a temporary file and renames it into place, so readers never
    /// see a partial file.
    pub fn put(&self, symbol: &str, day: NaiveDate, raw: &[RawQuote]) -> Result<PathBuf, LoadError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| LoadError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(symbol, day);
        let tmp = path.with_extension("csv.tmp");
        write_raw_csv(&tmp, raw)?;
        std::fs::rename(&tmp, &path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(symbol, %day, rows = raw.len(), path = %path.display(), "cached quotes");
        Ok(path)
    }

    /// All cache files, sorted by symbol then day. A missing directory is empty.
    pub fn status(&self) -> Result<Vec<CacheEntry>, LoadError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let io_err = |source| LoadError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();
            let Some((symbol, day)) = parse_cache_name(&path) else {
                continue;
            };
            let bytes = entry.metadata().map_err(io_err)?.len();
            entries.push(CacheEntry {
                symbol,
                day,
                path,
                bytes,
            });
        }
        entries.sort_by(|a, b| (&a.symbol, a.day).cmp(&(&b.symbol, b.day)));
        Ok(entries)
    }
}

/// Split `GOOG_2012-05-25.csv` into its symbol and day.
fn parse_cache_name(path: &Path) -> Option<(String, NaiveDate)> {
    if path.extension()? != "csv" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (symbol, day) = stem.rsplit_once('_')?;
    let day = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
    (!symbol.is_empty()).then(|| (symbol.to_string(), day))
}

/// Load the series for `symbol`, going through the cache for `day`.
pub fn load_series(
    symbol: &str,
    source: &dyn QuoteSource,
    cache: &QuoteCache,
    day: NaiveDate,
) -> Result<PriceSeries, LoadError> {
    let raw = match cache.get(symbol, day) {
        Some(raw) => raw,
        None => {
            let raw = source.fetch(symbol)?;
            info!(symbol, source = source.name(), rows = raw.len(), "fetched quotes");
            cache.put(symbol, day, &raw)?;
            raw
        }
    };
    Ok(PriceSeries::from_raw(symbol, &raw)?)
}
