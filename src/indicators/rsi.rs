// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — delta = price[t] - price[t-1]
// Step 2 — gain = max(delta, 0), loss = max(-delta, 0)
// Step 3 — Wilder-smooth both (α = 1/n, undefined until n deltas)
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// With no losses in the window RS is +∞ and RSI lands on exactly 100. With
// neither gains nor losses RS is 0/0 and RSI is undefined.
// =============================================================================

use crate::config::StyleConfig;
use crate::error::Result;
use crate::indicators::ema::{diff, ewm_mean, Smoothing};
use crate::indicators::{require_period, IndicatorInput, SeriesCatalog};
use crate::types::{IndicatorKind, Placement, SeriesStyle};

/// Compute the full RSI series for `price` and period `n`.
pub fn calculate_rsi(price: &[f64], n: usize) -> Vec<f64> {
    let delta = diff(price);
    let gain: Vec<f64> = delta.iter().map(|&d| clip_lower(d)).collect();
    let loss: Vec<f64> = delta.iter().map(|&d| clip_lower(-d)).collect();

    let avg_gain = ewm_mean(&gain, Smoothing::wilder(n), n);
    let avg_loss = ewm_mean(&loss, Smoothing::wilder(n), n);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| {
            let rs = g / l;
            100.0 - 100.0 / (1.0 + rs)
        })
        .collect()
}

/// `max(v, 0)` that keeps NaN as NaN.
fn clip_lower(v: f64) -> f64 {
    if v.is_nan() {
        v
    } else {
        v.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsi {
    pub n: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { n: 14 }
    }
}

impl Rsi {
    pub fn validate(&self) -> Result<()> {
        require_period("RSI", "n", self.n)
    }

    /// Outputs `RSI` as a line in the separate panel.
    pub fn compute(&self, input: &IndicatorInput<'_>, styles: &StyleConfig) -> Result<SeriesCatalog> {
        self.validate()?;

        let rsi = calculate_rsi(input.price(), self.n);

        let mut catalog = SeriesCatalog::new(IndicatorKind::Rsi, input.frame().index());
        catalog.push("RSI", rsi, Placement::SeparatePanel, SeriesStyle::Line, styles);
        Ok(catalog)
    }
}
