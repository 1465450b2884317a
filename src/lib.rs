// =============================================================================
// stocklab — OHLCV cache and technical-indicator engine
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod render;
pub mod stock;
pub mod types;

pub use cache::{CacheKey, CacheManager, CacheProbe, ChartSave, SaveReport};
pub use config::AppConfig;
pub use error::{Error, FetchError, Result};
pub use indicators::{IndicatorInput, IndicatorSpec, SeriesCatalog};
pub use market_data::{Column, CsvSource, FetchRequest, MarketDataSource, OhlcvFrame};
pub use render::{ChartArtifact, ChartRenderer};
pub use stock::{LoadOptions, RecordState, StockRecord};
pub use types::{IndicatorKind, Placement, SeriesStyle};
