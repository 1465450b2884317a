// =============================================================================
// OHLCV snapshot codec
// =============================================================================
//
// One JSON object with exactly five column objects, each mapping an epoch
// millisecond timestamp (as a string key) to a value:
//
//   { "Open": { "1704153600000": 10.0, ... }, "High": {...}, "Low": {...},
//     "Close": {...}, "Volume": {...} }
//
// Decoding is positional: whatever the column labels say, the first column is
// Open, then High, Low, Close, Volume. Missing values are written as null.
// Every column must carry the same timestamps, and at least one row.
// =============================================================================

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::market_data::{Column, OhlcvFrame};

type ColumnTable = IndexMap<String, Option<f64>>;

/// Serialise the whole frame.
pub fn encode(frame: &OhlcvFrame) -> serde_json::Result<String> {
    let keys: Vec<String> = frame
        .index()
        .iter()
        .map(|t| t.timestamp_millis().to_string())
        .collect();

    let table: IndexMap<&str, ColumnTable> = Column::ALL
        .iter()
        .map(|&col| {
            let values = keys
                .iter()
                .cloned()
                .zip(frame.column(col).iter().map(|&v| v.is_finite().then_some(v)))
                .collect();
            (col.label(), values)
        })
        .collect();

    serde_json::to_string(&table)
}

/// Parse a snapshot. The error string explains what was wrong with it.
pub fn decode(text: &str) -> Result<OhlcvFrame, String> {
    let table: IndexMap<String, ColumnTable> =
        serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;

    if table.len() != Column::ALL.len() {
        return Err(format!(
            "expected {} columns, found {}",
            Column::ALL.len(),
            table.len()
        ));
    }

    let columns: Vec<&ColumnTable> = table.values().collect();
    if columns[0].is_empty() {
        return Err("snapshot holds no rows".to_string());
    }
    for (label, column) in table.iter().skip(1) {
        if column.len() != columns[0].len()
            || column.keys().any(|key| !columns[0].contains_key(key))
        {
            return Err(format!(
                "column {label:?} does not share the timestamps of the first column"
            ));
        }
    }

    let mut rows: Vec<(DateTime<Utc>, [f64; 5])> = Vec::with_capacity(columns[0].len());

    for key in columns[0].keys() {
        let millis: i64 = key
            .parse()
            .map_err(|_| format!("timestamp key {key:?} is not epoch milliseconds"))?;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| format!("timestamp {millis} out of range"))?;

        let mut values = [f64::NAN; 5];
        for (slot, column) in values.iter_mut().zip(&columns) {
            *slot = column.get(key).copied().flatten().unwrap_or(f64::NAN);
        }
        rows.push((timestamp, values));
    }

    rows.sort_by_key(|(t, _)| *t);

    let mut index = Vec::with_capacity(rows.len());
    let mut cols: [Vec<f64>; 5] = Default::default();
    for (timestamp, values) in rows {
        index.push(timestamp);
        for (col, v) in cols.iter_mut().zip(values) {
            col.push(v);
        }
    }

    OhlcvFrame::from_columns(index, cols).map_err(|e| e.to_string())
}

/// Write `text` to `path` atomically (sibling `.tmp`, then rename).
pub fn write_atomic(path: &Path, text: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, text)?;
    std::fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Bar;
    use chrono::TimeZone;

    fn sample() -> OhlcvFrame {
        let bars = (0..4)
            .map(|i| Bar {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1 + i, 0, 0, 0).unwrap(),
                open: 10.0 + f64::from(i),
                high: 11.5 + f64::from(i),
                low: 9.25 + f64::from(i),
                close: 10.75 + f64::from(i),
                volume: 1_000_000.0 * f64::from(i + 1),
            })
            .collect();
        OhlcvFrame::from_bars(bars).unwrap()
    }

    #[test]
    fn write_then_read_is_identical() {
        let frame = sample();
        let text = encode(&frame).unwrap();
        let back = decode(&text).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn inexact_floats_survive_the_round_trip() {
        let bars = (0..50)
            .map(|i| {
                let c = 50.0 + (f64::from(i) * 0.37).sin() * 3.0 + f64::from(i) * 0.1;
                Bar {
                    timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + chrono::Duration::days(i64::from(i)),
                    open: 0.1 + 0.2,
                    high: c + 1.0 / 3.0,
                    low: c - std::f64::consts::PI / 7.0,
                    close: c,
                    volume: 1e6 / 7.0,
                }
            })
            .collect();
        let frame = OhlcvFrame::from_bars(bars).unwrap();
        let back = decode(&encode(&frame).unwrap()).unwrap();
        for col in Column::ALL {
            let same = frame
                .column(col)
                .iter()
                .zip(back.column(col))
                .all(|(a, b)| a.to_bits() == b.to_bits());
            assert!(same, "{col} drifted");
        }
    }

    #[test]
    fn columns_are_written_in_snapshot_order() {
        let text = encode(&sample()).unwrap();
        let table: IndexMap<String, serde_json::Value> = serde_json::from_str(&text).unwrap();
        let labels: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(labels, ["Open", "High", "Low", "Close", "Volume"]);
    }

    #[test]
    fn decode_ignores_column_labels() {
        let text = r#"{
            "a": { "1714521600000": 1.0, "1714608000000": 2.0 },
            "b": { "1714521600000": 3.0, "1714608000000": 4.0 },
            "c": { "1714521600000": 0.5, "1714608000000": 1.5 },
            "d": { "1714521600000": 2.5, "1714608000000": 3.5 },
            "e": { "1714521600000": 100, "1714608000000": null }
        }"#;
        let frame = decode(text).unwrap();
        assert_eq!(frame.open(), &[1.0, 2.0]);
        assert_eq!(frame.high(), &[3.0, 4.0]);
        assert_eq!(frame.low(), &[0.5, 1.5]);
        assert_eq!(frame.close(), &[2.5, 3.5]);
        assert_eq!(frame.volume()[0], 100.0);
        assert!(frame.volume()[1].is_nan());
    }

    #[test]
    fn decode_sorts_rows_by_time() {
        let text = r#"{
            "Open":   { "2000": 2.0, "1000": 1.0 },
            "High":   { "2000": 2.0, "1000": 1.0 },
            "Low":    { "2000": 2.0, "1000": 1.0 },
            "Close":  { "2000": 2.0, "1000": 1.0 },
            "Volume": { "2000": 2.0, "1000": 1.0 }
        }"#;
        let frame = decode(text).unwrap();
        assert_eq!(frame.close(), &[1.0, 2.0]);
    }

    #[test]
    fn decode_rejects_wrong_column_count() {
        let err = decode(r#"{ "Open": {}, "Close": {} }"#).unwrap_err();
        assert!(err.contains("expected 5 columns"));
    }

    #[test]
    fn decode_rejects_empty_table() {
        let err = decode(r#"{"Open":{},"High":{},"Low":{},"Close":{},"Volume":{}}"#).unwrap_err();
        assert!(err.contains("no rows"));
    }

    #[test]
    fn decode_rejects_mismatched_timestamps() {
        let text = r#"{
            "Open":   { "1000": 1.0 },
            "High":   { "1000": 1.0, "2000": 2.0 },
            "Low":    { "1000": 1.0 },
            "Close":  { "1000": 1.0 },
            "Volume": { "1000": 1.0 }
        }"#;
        assert!(decode(text).unwrap_err().contains("\"High\""));

        let shifted = r#"{
            "Open":   { "1000": 1.0 },
            "High":   { "1000": 1.0 },
            "Low":    { "3000": 1.0 },
            "Close":  { "1000": 1.0 },
            "Volume": { "1000": 1.0 }
        }"#;
        assert!(decode(shifted).is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("not json at all").is_err());
        assert!(decode(r#"{"Open":{"yesterday":1},"H":{},"L":{},"C":{},"V":{}}"#).is_err());
    }

    #[test]
    fn atomic_write_leaves_no_tmp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("X.json");
        write_atomic(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!path.with_extension("json.tmp").exists());
    }
}
