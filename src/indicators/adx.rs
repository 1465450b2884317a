// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. up = H - prevH, down = prevL - L.
//   2. +DM = max(up, 0) if it exceeds max(down, 0), else 0; -DM symmetric.
//      At most one of them is non-zero on any bar.
//   3. ATR(n) over the same bars (Wilder, α = 1/n).
//   4. +DI = 100 · EWMA(+DM, com = n) / ATR,  -DI likewise.
//      The directional movement uses the centre-of-mass factor α = 1/(n+1),
//      not the α = 1/n of step 3. Both are kept as they are.
//   5. DX  = 100 · |+DI - -DI| / (+DI + -DI)
//   6. ADX = EWMA(DX, α = 1/n)
//
// Every smoothing needs n observations before it is defined.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use crate::config::StyleConfig;
use crate::error::Result;
use crate::indicators::atr::calculate_atr;
use crate::indicators::ema::{ewm_mean, Smoothing};
use crate::indicators::{require_period, IndicatorInput, SeriesCatalog};
use crate::types::{IndicatorKind, Placement, SeriesStyle};

/// Intermediate and final ADX series, aligned on the input.
#[derive(Debug, Clone)]
pub struct AdxSeries {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

/// Mutually exclusive directional movement per bar. Position 0 is NaN.
pub fn directional_movement(high: &[f64], low: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = high.len().min(low.len());
    let mut plus = Vec::with_capacity(n);
    let mut minus = Vec::with_capacity(n);
    if n == 0 {
        return (plus, minus);
    }
    plus.push(f64::NAN);
    minus.push(f64::NAN);

    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up.is_nan() || down.is_nan() {
            plus.push(f64::NAN);
            minus.push(f64::NAN);
            continue;
        }
        let pdm = up.max(0.0);
        let ndm = down.max(0.0);
        plus.push(if pdm > ndm { pdm } else { 0.0 });
        minus.push(if ndm > pdm { ndm } else { 0.0 });
    }
    (plus, minus)
}

/// Compute the ADX pipeline for period `n`.
pub fn calculate_adx(high: &[f64], low: &[f64], close: &[f64], n: usize) -> AdxSeries {
    let atr = calculate_atr(high, low, close, n);
    let (plus_dm, minus_dm) = directional_movement(high, low);

    let dm_smoothing = Smoothing::CenterOfMass(n as f64);
    let smoothed_plus = ewm_mean(&plus_dm, dm_smoothing, n);
    let smoothed_minus = ewm_mean(&minus_dm, dm_smoothing, n);

    let di = |dm: &[f64]| -> Vec<f64> {
        dm.iter().zip(&atr).map(|(d, a)| 100.0 * d / a).collect()
    };
    let plus_di = di(&smoothed_plus);
    let minus_di = di(&smoothed_minus);

    let dx: Vec<f64> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(p, m)| 100.0 * (p - m).abs() / (p + m))
        .collect();
    let adx = ewm_mean(&dx, Smoothing::wilder(n), n);

    AdxSeries {
        plus_di,
        minus_di,
        dx,
        adx,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adx {
    pub n: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { n: 14 }
    }
}

impl Adx {
    pub fn validate(&self) -> Result<()> {
        require_period("ADX", "n", self.n)
    }

    /// Outputs `ADX` as a line in the separate panel.
    pub fn compute(&self, input: &IndicatorInput<'_>, styles: &StyleConfig) -> Result<SeriesCatalog> {
        self.validate()?;

        let frame = input.frame();
        let series = calculate_adx(frame.high(), frame.low(), frame.close(), self.n);

        let mut catalog = SeriesCatalog::new(IndicatorKind::Adx, frame.index());
        catalog.push("ADX", series.adx, Placement::SeparatePanel, SeriesStyle::Line, styles);
        Ok(catalog)
    }
}
