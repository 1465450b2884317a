// =============================================================================
// Error taxonomy
// =============================================================================
//
// `Error` is what every library operation returns. A missing cache snapshot is
// absent from this enum: it is a state (`CacheProbe::Missing`),
// not a failure.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the indicator engine, the cache manager and the
/// stock record orchestrator.
#[derive(Debug, Error)]
pub enum Error {
    /// Conflicting or missing request parameters, or malformed input data.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An indicator parameter outside its valid domain (e.g. a zero period).
    #[error("invalid parameter for {indicator}: {param} = {value}")]
    InvalidParameter {
        indicator: &'static str,
        param: &'static str,
        value: f64,
    },

    /// An operation that needs price data was attempted before any load or
    /// fetch populated the record.
    #[error("no data loaded for {subject}; load or fetch first")]
    DataNotReady { subject: String },

    /// A snapshot file exists but could not be decoded.
    #[error("cache snapshot at {} is corrupt: {reason}", path.display())]
    CacheCorrupt { path: PathBuf, reason: String },

    /// The external market-data collaborator failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing the snapshot (or creating its directories) failed.
    #[error("failed to persist {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn not_ready(subject: impl Into<String>) -> Self {
        Error::DataNotReady {
            subject: subject.into(),
        }
    }
}

/// Failures reported by a [`MarketDataSource`](crate::market_data::MarketDataSource).
///
/// `NoData` is the provider answering "nothing in that range"; the other
/// variants mean the request itself did not get through.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data for {ticker} in the requested window")]
    NoData { ticker: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("provider returned malformed data: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}
