//! Offline [`MarketDataSource`] backed by a CSV export.
//!
//! Accepts the usual `Date,Open,High,Low,Close,Volume` layout (header names are
//! matched case-insensitively, extra columns are ignored). Dates may be
//! `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, RFC 3339 or Unix seconds.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::error::FetchError;
use crate::market_data::{Bar, FetchWindow, MarketDataSource};

/// Reads bars from a CSV file on every fetch.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<Vec<Bar>, FetchError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| FetchError::Transport(format!("{}: {e}", self.path.display())))?;

        let headers = reader
            .headers()
            .map_err(|e| FetchError::Malformed(e.to_string()))?
            .clone();
        let headers_lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let find = |names: &[&str]| {
            headers_lower
                .iter()
                .position(|h| names.contains(&h.as_str()))
                .ok_or_else(|| FetchError::Malformed(format!("missing column {}", names[0])))
        };

        let date_idx = find(&["date", "datetime", "timestamp", "time"])?;
        let open_idx = find(&["open"])?;
        let high_idx = find(&["high"])?;
        let low_idx = find(&["low"])?;
        let close_idx = find(&["close"])?;
        let volume_idx = find(&["volume"])?;

        let mut bars = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| FetchError::Malformed(e.to_string()))?;
            let field = |idx: usize| record.get(idx).unwrap_or("");
            let number = |idx: usize| -> Result<f64, FetchError> {
                let raw = field(idx);
                if raw.is_empty() {
                    return Ok(f64::NAN);
                }
                raw.parse::<f64>().map_err(|_| {
                    FetchError::Malformed(format!("row {}: bad number {raw:?}", line + 1))
                })
            };

            let timestamp = parse_timestamp(field(date_idx)).ok_or_else(|| {
                FetchError::Malformed(format!(
                    "row {}: bad timestamp {:?}",
                    line + 1,
                    field(date_idx)
                ))
            })?;

            bars.push(Bar {
                timestamp,
                open: number(open_idx)?,
                high: number(high_idx)?,
                low: number(low_idx)?,
                close: number(close_idx)?,
                volume: number(volume_idx)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
        Ok(bars)
    }
}

impl MarketDataSource for CsvSource {
    fn fetch(
        &self,
        ticker: &str,
        window: &FetchWindow,
        interval: &str,
    ) -> Result<Vec<Bar>, FetchError> {
        let bars = self.read_all()?;
        let Some(last) = bars.last().map(|b| b.timestamp) else {
            return Err(FetchError::NoData {
                ticker: ticker.to_string(),
            });
        };

        let (from, until) = match window {
            FetchWindow::Range { start, end } => (midnight(*start), Some(midnight(*end))),
            FetchWindow::Period(p) => (period_start(p, last)?, None),
        };

        let selected: Vec<Bar> = bars
            .into_iter()
            .filter(|b| b.timestamp >= from && until.map_or(true, |u| b.timestamp < u))
            .collect();

        debug!(
            ticker,
            %window,
            interval,
            rows = selected.len(),
            path = %self.path.display(),
            "csv source read"
        );

        if selected.is_empty() {
            return Err(FetchError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(selected)
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Parse a timestamp cell. Bare dates map to midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(midnight(d));
    }
    if let Ok(secs) = s.parse::<f64>() {
        return DateTime::from_timestamp(secs as i64, 0);
    }
    None
}

/// Start of a named look-back ending at `anchor`.
fn period_start(period: &str, anchor: DateTime<Utc>) -> Result<DateTime<Utc>, FetchError> {
    let unsupported = || FetchError::Malformed(format!("unsupported period {period:?}"));

    match period {
        "max" => return Ok(DateTime::<Utc>::MIN_UTC),
        "ytd" => {
            return Utc
                .with_ymd_and_hms(anchor.year(), 1, 1, 0, 0, 0)
                .single()
                .ok_or_else(unsupported)
        }
        _ => {}
    }

    let split = period
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(unsupported)?;
    let (count, unit) = period.split_at(split);
    let count: u32 = count.parse().map_err(|_| unsupported())?;

    let start = match unit {
        "d" => anchor.checked_sub_signed(chrono::Duration::days(i64::from(count))),
        "wk" => anchor.checked_sub_signed(chrono::Duration::weeks(i64::from(count))),
        "mo" => anchor.checked_sub_months(Months::new(count)),
        "y" => count
            .checked_mul(12)
            .and_then(|months| anchor.checked_sub_months(Months::new(months))),
        _ => None,
    };
    start.ok_or_else(unsupported)
}
