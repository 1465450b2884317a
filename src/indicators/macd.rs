// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   fast   = EMA(price, span = a)
//   slow   = EMA(price, span = b)
//   macd   = fast - slow
//   signal = EMA(macd, span = c)
//   delta  = signal - macd
//
// Each EMA is undefined until its span has accumulated, so `macd` starts at
// max(a, b) - 1 and `signal` c - 1 positions later.
//
// Defaults: a = 12, b = 26, c = 9.
// =============================================================================

use crate::config::StyleConfig;
use crate::error::Result;
use crate::indicators::ema::calculate_ema;
use crate::indicators::{require_period, IndicatorInput, SeriesCatalog};
use crate::types::{IndicatorKind, Placement, SeriesStyle};

/// The three MACD series, aligned on the input.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub delta: Vec<f64>,
}

/// Compute MACD over `price` with fast span `a`, slow span `b` and signal
/// span `c`.
pub fn calculate_macd(price: &[f64], a: usize, b: usize, c: usize) -> MacdSeries {
    let fast = calculate_ema(price, a);
    let slow = calculate_ema(price, b);
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = calculate_ema(&macd, c);
    let delta = signal.iter().zip(&macd).map(|(s, m)| s - m).collect();
    MacdSeries {
        macd,
        signal,
        delta,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macd {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self { a: 12, b: 26, c: 9 }
    }
}

impl Macd {
    pub fn validate(&self) -> Result<()> {
        require_period("MACD", "a", self.a)?;
        require_period("MACD", "b", self.b)?;
        require_period("MACD", "c", self.c)
    }

    /// Outputs `MACD` (line), `sig` (line) and `deltaMACD` (bar), all in the
    /// separate panel.
    pub fn compute(&self, input: &IndicatorInput<'_>, styles: &StyleConfig) -> Result<SeriesCatalog> {
        self.validate()?;

        let series = calculate_macd(input.price(), self.a, self.b, self.c);

        let mut catalog = SeriesCatalog::new(IndicatorKind::Macd, input.frame().index());
        let panel = Placement::SeparatePanel;
        catalog.push("MACD", series.macd, panel, SeriesStyle::Line, styles);
        catalog.push("sig", series.signal, panel, SeriesStyle::Line, styles);
        catalog.push("deltaMACD", series.delta, panel, SeriesStyle::Bar, styles);
        Ok(catalog)
    }
}
