// =============================================================================
// Fetch collaborator boundary
// =============================================================================
//
// The crate never talks to a market-data vendor directly. A caller supplies a
// `MarketDataSource`; the record validates the request, hands the source a
// `FetchWindow` and takes ownership of the bars it returns.
// =============================================================================

use chrono::NaiveDate;

use crate::error::{Error, FetchError, Result};
use crate::market_data::Bar;

/// What to fetch: a named look-back (`"1mo"`, `"1y"`, `"max"`) or an explicit
/// date range (end exclusive, as vendors usually treat it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchWindow {
    Period(String),
    Range { start: NaiveDate, end: NaiveDate },
}

impl std::fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Period(p) => write!(f, "period={p}"),
            Self::Range { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

/// A fetch request as a caller states it. Exactly one of `period` or
/// `start` must be set; [`FetchRequest::validate`] enforces that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub period: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Bar interval (`"1d"`, `"5m"`, ...). Falls back to the configured
    /// default when `None`.
    pub interval: Option<String>,
    /// Discard any data already held and fetch again.
    pub overwrite: bool,
}

impl FetchRequest {
    pub fn period(period: impl Into<String>) -> Self {
        Self {
            period: Some(period.into()),
            ..Self::default()
        }
    }

    pub fn range(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            start: Some(start),
            end,
            ..Self::default()
        }
    }

    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Resolve the request into a [`FetchWindow`]. A range without an end
    /// runs up to `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<FetchWindow> {
        let period = self.period.as_deref().filter(|p| !p.trim().is_empty());

        match (period, self.start) {
            (Some(_), Some(_)) => Err(Error::validation(
                "both a period and a start date were given; pass exactly one",
            )),
            (None, None) => Err(Error::validation(
                "neither a period nor a start date was given; pass exactly one",
            )),
            (Some(p), None) => {
                if self.end.is_some() {
                    return Err(Error::validation("an end date requires a start date"));
                }
                Ok(FetchWindow::Period(p.trim().to_string()))
            }
            (None, Some(start)) => {
                let end = self.end.unwrap_or(today);
                if start > end {
                    return Err(Error::validation(format!(
                        "start {start} is after end {end}"
                    )));
                }
                Ok(FetchWindow::Range { start, end })
            }
        }
    }
}

/// The external market-data collaborator.
///
/// Implementations block until the vendor answers. They must report an empty
/// answer as [`FetchError::NoData`] and keep it distinct from transport or
/// authentication failures.
pub trait MarketDataSource {
    fn fetch(
        &self,
        ticker: &str,
        window: &FetchWindow,
        interval: &str,
    ) -> std::result::Result<Vec<Bar>, FetchError>;
}
