// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// The first bar has no previous close, so its TR is undefined.
//
// ATR is the exponentially weighted mean of TR with Wilder's factor
// α = 1/n, undefined until n TR values have accumulated.
//
// Default period: 14
// =============================================================================

use crate::config::StyleConfig;
use crate::error::Result;
use crate::indicators::ema::{ewm_mean, Smoothing};
use crate::indicators::{require_period, IndicatorInput, SeriesCatalog};
use crate::types::{IndicatorKind, Placement, SeriesStyle};

/// Per-bar true range. Position 0 is NaN, as is any bar with a missing input.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = Vec::with_capacity(n);
    if n == 0 {
        return tr;
    }
    tr.push(f64::NAN);

    for i in 1..n {
        let (h, l, prev_close) = (high[i], low[i], close[i - 1]);
        if h.is_nan() || l.is_nan() || prev_close.is_nan() {
            tr.push(f64::NAN);
            continue;
        }
        let hl = h - l;
        let hc = (h - prev_close).abs();
        let lc = (l - prev_close).abs();
        tr.push(hl.max(hc).max(lc));
    }
    tr
}

/// Wilder-smoothed ATR series for period `n`.
pub fn calculate_atr(high: &[f64], low: &[f64], close: &[f64], n: usize) -> Vec<f64> {
    smooth_true_range(&true_range(high, low, close), n)
}

fn smooth_true_range(tr: &[f64], n: usize) -> Vec<f64> {
    ewm_mean(tr, Smoothing::wilder(n), n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atr {
    pub n: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { n: 14 }
    }
}

impl Atr {
    pub fn validate(&self) -> Result<()> {
        require_period("ATR", "n", self.n)
    }

    /// Outputs `TR` and `ATR`, both overlaid on the price.
    pub fn compute(&self, input: &IndicatorInput<'_>, styles: &StyleConfig) -> Result<SeriesCatalog> {
        self.validate()?;

        let frame = input.frame();
        let tr = true_range(frame.high(), frame.low(), frame.close());
        let atr = smooth_true_range(&tr, self.n);

        let mut catalog = SeriesCatalog::new(IndicatorKind::Atr, frame.index());
        let overlay = Placement::OverlayOnPrice;
        catalog.push("TR", tr, overlay, SeriesStyle::Line, styles);
        catalog.push("ATR", atr, overlay, SeriesStyle::Line, styles);
        Ok(catalog)
    }
}
