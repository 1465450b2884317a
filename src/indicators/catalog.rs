// =============================================================================
// SeriesCatalog — named, styled indicator outputs
// =============================================================================
//
// A catalog holds every series one indicator produced, split into two ordered
// buckets: `onstock` (drawn over the price) and `indicator` (drawn in its own
// panel). Insertion order is display order. Values are aligned one-to-one with
// the source frame's index; NaN marks a position that is not yet defined.
// =============================================================================

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::StyleConfig;
use crate::types::{IndicatorKind, Placement, SeriesStyle};

/// One derived series plus its presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorOutput {
    pub key: String,
    pub values: Vec<f64>,
    pub placement: Placement,
    pub style: SeriesStyle,
    pub color: Option<String>,
    /// Label shown by a renderer; the key unless the style config overrides it.
    pub display_name: String,
}

impl IndicatorOutput {
    /// Value at position `i`, `None` where undefined.
    pub fn value_at(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().filter(|v| !v.is_nan())
    }

    /// Most recent defined value.
    pub fn last_value(&self) -> Option<f64> {
        self.values.iter().rev().copied().find(|v| !v.is_nan())
    }

    /// Number of leading undefined positions.
    pub fn warmup(&self) -> usize {
        self.values.iter().take_while(|v| v.is_nan()).count()
    }
}

/// Everything one indicator computation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesCatalog {
    kind: IndicatorKind,
    index: Vec<DateTime<Utc>>,
    onstock: IndexMap<String, IndicatorOutput>,
    indicator: IndexMap<String, IndicatorOutput>,
}

/// Plain tables of a catalog's values, keyed by output name, sharing the
/// source index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawData {
    pub index: Vec<DateTime<Utc>>,
    pub overlay: IndexMap<String, Vec<f64>>,
    pub panel: IndexMap<String, Vec<f64>>,
}

impl SeriesCatalog {
    pub(crate) fn new(kind: IndicatorKind, index: &[DateTime<Utc>]) -> Self {
        Self {
            kind,
            index: index.to_vec(),
            onstock: IndexMap::new(),
            indicator: IndexMap::new(),
        }
    }

    /// Add an output, applying any color / name override from `styles`.
    pub(crate) fn push(
        &mut self,
        key: &str,
        values: Vec<f64>,
        placement: Placement,
        style: SeriesStyle,
        styles: &StyleConfig,
    ) {
        debug_assert_eq!(values.len(), self.index.len(), "{key} misaligned");

        let over = styles.get(key);
        let output = IndicatorOutput {
            key: key.to_string(),
            values,
            placement,
            style,
            color: over.and_then(|o| o.color.clone()),
            display_name: over
                .and_then(|o| o.name.clone())
                .unwrap_or_else(|| key.to_string()),
        };

        let bucket = match placement {
            Placement::OverlayOnPrice => &mut self.onstock,
            Placement::SeparatePanel => &mut self.indicator,
        };
        bucket.insert(key.to_string(), output);
    }

    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// Outputs drawn over the price chart, in display order.
    pub fn onstock(&self) -> &IndexMap<String, IndicatorOutput> {
        &self.onstock
    }

    /// Outputs drawn in a separate panel, in display order.
    pub fn indicator(&self) -> &IndexMap<String, IndicatorOutput> {
        &self.indicator
    }

    /// Look an output up by key in either bucket.
    pub fn get(&self, key: &str) -> Option<&IndicatorOutput> {
        self.onstock.get(key).or_else(|| self.indicator.get(key))
    }

    /// All outputs, overlay bucket first.
    pub fn outputs(&self) -> impl Iterator<Item = &IndicatorOutput> {
        self.onstock.values().chain(self.indicator.values())
    }

    pub fn raw_data(&self) -> RawData {
        let table = |bucket: &IndexMap<String, IndicatorOutput>| {
            bucket
                .iter()
                .map(|(k, o)| (k.clone(), o.values.clone()))
                .collect()
        };
        RawData {
            index: self.index.clone(),
            overlay: table(&self.onstock),
            panel: table(&self.indicator),
        }
    }

    /// Latest defined value of every output, in display order.
    pub fn last_values(&self) -> Vec<(&str, Option<f64>)> {
        self.outputs()
            .map(|o| (o.key.as_str(), o.last_value()))
            .collect()
    }
}
