// =============================================================================
// Bollinger Bands
// =============================================================================
//
// A middle band (rolling mean over n samples), an upper band (mean + k·σ) and
// a lower band (mean - k·σ), where σ is the rolling sample standard deviation
// over the same n samples. The band range (upper - lower) goes to its own
// panel.
//
// The first n - 1 positions are undefined.

use crate::config::StyleConfig;
use crate::error::{Error, Result};
use crate::indicators::ema::{rolling_mean, rolling_std};
use crate::indicators::{require_period, IndicatorInput, SeriesCatalog};
use crate::types::{IndicatorKind, Placement, SeriesStyle};

/// Band series aligned on the input.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub range: Vec<f64>,
}

/// Calculate Bollinger Bands over `price` with window `n` and width `k`.
pub fn calculate_bollinger(price: &[f64], n: usize, k: f64) -> BollingerSeries {
    let mean = rolling_mean(price, n);
    let std = rolling_std(price, n);

    let upper: Vec<f64> = mean.iter().zip(&std).map(|(m, s)| m + k * s).collect();
    let lower: Vec<f64> = mean.iter().zip(&std).map(|(m, s)| m - k * s).collect();
    let range = upper.iter().zip(&lower).map(|(u, l)| u - l).collect();

    BollingerSeries {
        upper,
        mean,
        lower,
        range,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub n: usize,
    pub k: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self { n: 20, k: 2.0 }
    }
}

impl BollingerBands {
    pub fn validate(&self) -> Result<()> {
        require_period("BollingerBands", "n", self.n)?;
        if !self.k.is_finite() || self.k < 0.0 {
            return Err(Error::InvalidParameter {
                indicator: "BollingerBands",
                param: "k",
                value: self.k,
            });
        }
        Ok(())
    }

    /// Outputs `upper`, `lower` and `mean` over the price, `range` in a panel.
    pub fn compute(&self, input: &IndicatorInput<'_>, styles: &StyleConfig) -> Result<SeriesCatalog> {
        self.validate()?;

        let bands = calculate_bollinger(input.price(), self.n, self.k);

        let mut catalog = SeriesCatalog::new(IndicatorKind::BollingerBands, input.frame().index());
        let overlay = Placement::OverlayOnPrice;
        catalog.push("upper", bands.upper, overlay, SeriesStyle::BandUpper, styles);
        catalog.push("lower", bands.lower, overlay, SeriesStyle::BandLower, styles);
        catalog.push("mean", bands.mean, overlay, SeriesStyle::Line, styles);
        catalog.push("range", bands.range, Placement::SeparatePanel, SeriesStyle::Bar, styles);
        Ok(catalog)
    }
}
