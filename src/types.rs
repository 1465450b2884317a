// =============================================================================
// Shared vocabulary used across the indicator engine and the catalog
// =============================================================================

use serde::{Deserialize, Serialize};

/// Where a derived series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Drawn atop the price chart.
    OverlayOnPrice,
    /// Drawn in its own sub-chart below the price.
    SeparatePanel,
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverlayOnPrice => write!(f, "overlay-on-price"),
            Self::SeparatePanel => write!(f, "separate-panel"),
        }
    }
}

/// Closed set of display styles a renderer must understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesStyle {
    Line,
    Bar,
    BandUpper,
    BandLower,
}

impl std::fmt::Display for SeriesStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line => write!(f, "line"),
            Self::Bar => write!(f, "bar"),
            Self::BandUpper => write!(f, "band-upper"),
            Self::BandLower => write!(f, "band-lower"),
        }
    }
}

/// The indicator families the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Macd,
    Atr,
    BollingerBands,
    Rsi,
    Adx,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 5] = [
        IndicatorKind::Macd,
        IndicatorKind::Atr,
        IndicatorKind::BollingerBands,
        IndicatorKind::Rsi,
        IndicatorKind::Adx,
    ];
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Macd => write!(f, "MACD"),
            Self::Atr => write!(f, "ATR"),
            Self::BollingerBands => write!(f, "BollingerBands"),
            Self::Rsi => write!(f, "RSI"),
            Self::Adx => write!(f, "ADX"),
        }
    }
}
