pub mod csv_source;
pub mod ohlcv;
pub mod source;

// Re-export the frame types for convenient access (e.g. `use crate::market_data::OhlcvFrame`).
pub use csv_source::CsvSource;
pub use ohlcv::{pct_change, Bar, Column, OhlcvFrame};
pub use source::{FetchRequest, FetchWindow, MarketDataSource};
