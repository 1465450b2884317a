use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifies one persisted snapshot: ticker, as-of date and, for intraday
/// data, the bar interval.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheKey {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub intraday: Option<String>,
}

impl CacheKey {
    pub fn new(ticker: impl Into<String>, as_of: NaiveDate, intraday: Option<&str>) -> Self {
        Self {
            ticker: ticker.into(),
            as_of,
            intraday: intraday
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Ticker with `.` replaced by `-` so it is a single path component.
    pub fn safe_ticker(&self) -> String {
        self.ticker.replace('.', "-")
    }

    /// `YYYY-MM-DD`, or `YYYY-MM-DD_<interval>` for intraday keys.
    pub fn dir_name(&self) -> String {
        match &self.intraday {
            Some(interval) => format!("{}_{}", self.as_of.format("%Y-%m-%d"), interval),
            None => self.as_of.format("%Y-%m-%d").to_string(),
        }
    }

    /// Resolve the on-disk layout under `root`.
    pub fn resolve(&self, root: &Path) -> CachePaths {
        let safe = self.safe_ticker();
        let ticker_dir = root.join(&safe);
        let key_dir = ticker_dir.join(self.dir_name());
        let json_dir = key_dir.join("json");
        let svg_dir = key_dir.join("svg");
        CachePaths {
            json_file: json_dir.join(format!("{safe}.json")),
            svg_file: svg_dir.join(format!("{safe}.svg")),
            ticker_dir,
            key_dir,
            json_dir,
            svg_dir,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.ticker, self.dir_name())
    }
}

/// Every path belonging to one cache key.
///
/// `<root>/<T'>/<date>[_<intraday>]/json/<T'>.json`
/// `<root>/<T'>/<date>[_<intraday>]/svg/<T'>.svg`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    pub ticker_dir: PathBuf,
    pub key_dir: PathBuf,
    pub json_dir: PathBuf,
    pub svg_dir: PathBuf,
    pub json_file: PathBuf,
    pub svg_file: PathBuf,
}

impl CachePaths {
    /// Create the json/ and svg/ folders. Existing folders are fine.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.json_dir)?;
        std::fs::create_dir_all(&self.svg_dir)
    }
}
