use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar as returned by a market-data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// The five value columns, in snapshot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    /// Snapshot column order. Decoding assigns these positionally.
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::Volume => "Volume",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// OhlcvFrame -- column-oriented, timestamp-indexed price table
// ---------------------------------------------------------------------------

/// Ordered OHLCV table: one timestamp index and one `Vec<f64>` per column.
///
/// Timestamps are strictly increasing. Missing values are `f64::NAN`.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvFrame {
    index: Vec<DateTime<Utc>>,
    columns: [Vec<f64>; 5],
}

impl OhlcvFrame {
    /// Build a frame from bars (oldest first).
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self> {
        let mut index = Vec::with_capacity(bars.len());
        let mut columns: [Vec<f64>; 5] = Default::default();
        for col in columns.iter_mut() {
            col.reserve(bars.len());
        }

        for bar in bars {
            index.push(bar.timestamp);
            columns[0].push(bar.open);
            columns[1].push(bar.high);
            columns[2].push(bar.low);
            columns[3].push(bar.close);
            columns[4].push(bar.volume);
        }

        Self::from_columns(index, columns)
    }

    /// Build a frame from an index and the five columns in [`Column::ALL`]
    /// order.
    pub fn from_columns(index: Vec<DateTime<Utc>>, columns: [Vec<f64>; 5]) -> Result<Self> {
        if let Some(col) = columns.iter().position(|c| c.len() != index.len()) {
            return Err(Error::validation(format!(
                "column {} has {} values for an index of {}",
                Column::ALL[col],
                columns[col].len(),
                index.len()
            )));
        }
        if let Some(pos) = index.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::validation(format!(
                "timestamps must be strictly increasing (position {} -> {})",
                index[pos],
                index[pos + 1]
            )));
        }
        Ok(Self { index, columns })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn column(&self, column: Column) -> &[f64] {
        &self.columns[column as usize]
    }

    pub fn open(&self) -> &[f64] {
        self.column(Column::Open)
    }

    pub fn high(&self) -> &[f64] {
        self.column(Column::High)
    }

    pub fn low(&self) -> &[f64] {
        self.column(Column::Low)
    }

    pub fn close(&self) -> &[f64] {
        self.column(Column::Close)
    }

    pub fn volume(&self) -> &[f64] {
        self.column(Column::Volume)
    }

    /// Bar at position `i`, if any.
    pub fn bar(&self, i: usize) -> Option<Bar> {
        let timestamp = *self.index.get(i)?;
        Some(Bar {
            timestamp,
            open: self.columns[0][i],
            high: self.columns[1][i],
            low: self.columns[2][i],
            close: self.columns[3][i],
            volume: self.columns[4][i],
        })
    }

    pub fn last_bar(&self) -> Option<Bar> {
        self.len().checked_sub(1).and_then(|i| self.bar(i))
    }

    /// Iterate the frame row by row.
    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.len()).filter_map(move |i| self.bar(i))
    }

    /// Per-column percentage change, same index. The first row is undefined.
    pub fn pct_change(&self) -> OhlcvFrame {
        OhlcvFrame {
            index: self.index.clone(),
            columns: [
                pct_change(&self.columns[0]),
                pct_change(&self.columns[1]),
                pct_change(&self.columns[2]),
                pct_change(&self.columns[3]),
                pct_change(&self.columns[4]),
            ],
        }
    }
}

/// Elementwise `v[t] / v[t-1] - 1`. Position 0 is `NaN`.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(values.windows(2).map(|w| w[1] / w[0] - 1.0));
    out
}
