// =============================================================================
// Application Configuration — loaded once, passed explicitly
// =============================================================================
//
// Holds the cache root, fetch defaults, the default parameters of every
// indicator kind and the per-series style overrides. The value is immutable
// once loaded; the record and the indicator engine receive it by reference.
//
// Persistence uses the tmp + rename pattern. Every field carries a serde
// default so a partial file still loads.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_cache_root() -> PathBuf {
    PathBuf::from("StockData")
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_period() -> String {
    "1y".to_string()
}

fn default_macd() -> MacdParams {
    MacdParams { a: 12, b: 26, c: 9 }
}

fn default_14() -> usize {
    14
}

fn default_bollinger() -> BollingerParams {
    BollingerParams { n: 20, k: 2.0 }
}

// =============================================================================
// Indicator parameter tables
// =============================================================================

/// Fast span `a`, slow span `b`, signal span `c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdParams {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

/// Window `n` and band width `k` (in standard deviations).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    pub n: usize,
    pub k: f64,
}

/// Single-period parameter shared by ATR, RSI and ADX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodParams {
    #[serde(default = "default_14")]
    pub n: usize,
}

impl Default for PeriodParams {
    fn default() -> Self {
        Self { n: default_14() }
    }
}

/// Default parameters for each indicator kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndicatorDefaults {
    #[serde(rename = "MACD", default = "default_macd")]
    pub macd: MacdParams,

    #[serde(rename = "ATR", default)]
    pub atr: PeriodParams,

    #[serde(default = "default_bollinger")]
    pub bollinger_bands: BollingerParams,

    #[serde(rename = "RSI", default)]
    pub rsi: PeriodParams,

    #[serde(rename = "ADX", default)]
    pub adx: PeriodParams,
}

impl Default for IndicatorDefaults {
    fn default() -> Self {
        Self {
            macd: default_macd(),
            atr: PeriodParams::default(),
            bollinger_bands: default_bollinger(),
            rsi: PeriodParams::default(),
            adx: PeriodParams::default(),
        }
    }
}

// =============================================================================
// Style overrides
// =============================================================================

/// Optional presentation overrides for one output series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOverride {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Style overrides keyed by output series name (`"MACD"`, `"upper"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleConfig {
    entries: IndexMap<String, StyleOverride>,
}

impl StyleConfig {
    pub fn get(&self, series: &str) -> Option<&StyleOverride> {
        self.entries.get(series)
    }

    pub fn with(mut self, series: impl Into<String>, style: StyleOverride) -> Self {
        self.entries.insert(series.into(), style);
        self
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration for a stocklab session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory under which every ticker's cache tree lives.
    #[serde(default = "default_cache_root")]
    pub cache_root: PathBuf,

    /// Bar interval used when a fetch request does not name one.
    #[serde(default = "default_interval")]
    pub default_interval: String,

    /// Look-back period used by the binary when the cache is empty.
    #[serde(default = "default_period")]
    pub default_period: String,

    #[serde(default)]
    pub indicators: IndicatorDefaults,

    #[serde(default)]
    pub styles: StyleConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            default_interval: default_interval(),
            default_period: default_period(),
            indicators: IndicatorDefaults::default(),
            styles: StyleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can decide to fall back to
    /// defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            cache_root = %config.cache_root.display(),
            "config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` (write `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved");
        Ok(())
    }
}
