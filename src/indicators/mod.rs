// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free transformations from an OHLCV frame into a
// `SeriesCatalog`. Every output is aligned on the input index; positions where
// a window or smoothing has not accumulated enough samples are NaN rather than
// zero-filled.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod catalog;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use catalog::{IndicatorOutput, RawData, SeriesCatalog};
pub use macd::Macd;
pub use rsi::Rsi;

use crate::config::{IndicatorDefaults, StyleConfig};
use crate::error::{Error, Result};
use crate::market_data::OhlcvFrame;
use crate::types::IndicatorKind;

// =============================================================================
// Input
// =============================================================================

/// What an indicator reads: a non-empty frame, and optionally a caller
/// supplied price series that replaces `Close` for the single-series
/// indicators (MACD, RSI, Bollinger).
#[derive(Debug, Clone, Copy)]
pub struct IndicatorInput<'a> {
    frame: &'a OhlcvFrame,
    source: Option<&'a [f64]>,
}

impl<'a> IndicatorInput<'a> {
    pub fn new(frame: &'a OhlcvFrame) -> Result<Self> {
        if frame.is_empty() {
            return Err(Error::not_ready("indicator input"));
        }
        Ok(Self {
            frame,
            source: None,
        })
    }

    /// Use `source` instead of the close column. It must line up with the
    /// frame index.
    pub fn with_source(frame: &'a OhlcvFrame, source: &'a [f64]) -> Result<Self> {
        let input = Self::new(frame)?;
        if source.len() != frame.len() {
            return Err(Error::validation(format!(
                "source series has {} values, frame has {}",
                source.len(),
                frame.len()
            )));
        }
        Ok(Self {
            source: Some(source),
            ..input
        })
    }

    pub fn frame(&self) -> &'a OhlcvFrame {
        self.frame
    }

    /// The series single-input indicators operate on.
    pub fn price(&self) -> &'a [f64] {
        self.source.unwrap_or_else(|| self.frame.close())
    }
}

pub(crate) fn require_period(indicator: &'static str, param: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidParameter {
            indicator,
            param,
            value: 0.0,
        });
    }
    Ok(())
}

// =============================================================================
// IndicatorSpec — one variant per kind, carrying its parameters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorSpec {
    Macd(Macd),
    Atr(Atr),
    BollingerBands(BollingerBands),
    Rsi(Rsi),
    Adx(Adx),
}

impl IndicatorSpec {
    /// The configured default parameters for `kind`.
    pub fn defaults(kind: IndicatorKind, defaults: &IndicatorDefaults) -> Self {
        match kind {
            IndicatorKind::Macd => IndicatorSpec::Macd(Macd {
                a: defaults.macd.a,
                b: defaults.macd.b,
                c: defaults.macd.c,
            }),
            IndicatorKind::Atr => IndicatorSpec::Atr(Atr {
                n: defaults.atr.n,
            }),
            IndicatorKind::BollingerBands => IndicatorSpec::BollingerBands(BollingerBands {
                n: defaults.bollinger_bands.n,
                k: defaults.bollinger_bands.k,
            }),
            IndicatorKind::Rsi => IndicatorSpec::Rsi(Rsi {
                n: defaults.rsi.n,
            }),
            IndicatorKind::Adx => IndicatorSpec::Adx(Adx {
                n: defaults.adx.n,
            }),
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            IndicatorSpec::Macd(_) => IndicatorKind::Macd,
            IndicatorSpec::Atr(_) => IndicatorKind::Atr,
            IndicatorSpec::BollingerBands(_) => IndicatorKind::BollingerBands,
            IndicatorSpec::Rsi(_) => IndicatorKind::Rsi,
            IndicatorSpec::Adx(_) => IndicatorKind::Adx,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            IndicatorSpec::Macd(m) => m.validate(),
            IndicatorSpec::Atr(a) => a.validate(),
            IndicatorSpec::BollingerBands(b) => b.validate(),
            IndicatorSpec::Rsi(r) => r.validate(),
            IndicatorSpec::Adx(a) => a.validate(),
        }
    }

    pub fn compute(&self, input: &IndicatorInput<'_>, styles: &StyleConfig) -> Result<SeriesCatalog> {
        match self {
            IndicatorSpec::Macd(m) => m.compute(input, styles),
            IndicatorSpec::Atr(a) => a.compute(input, styles),
            IndicatorSpec::BollingerBands(b) => b.compute(input, styles),
            IndicatorSpec::Rsi(r) => r.compute(input, styles),
            IndicatorSpec::Adx(a) => a.compute(input, styles),
        }
    }
}
