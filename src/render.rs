//! Rendering collaborator boundary.
//!
//! The crate does not draw charts. A caller plugs in a [`ChartRenderer`]; the
//! record hands it the price frame plus every computed [`SeriesCatalog`] and
//! keeps the returned [`ChartArtifact`] until the next save.

use crate::indicators::SeriesCatalog;
use crate::market_data::OhlcvFrame;

/// A rendered chart, ready to be written next to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    svg: String,
}

impl ChartArtifact {
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self { svg: svg.into() }
    }

    pub fn as_svg(&self) -> &str {
        &self.svg
    }
}

/// Anything that can turn a frame and its indicator catalogs into a chart.
pub trait ChartRenderer {
    fn render(
        &self,
        ticker: &str,
        frame: &OhlcvFrame,
        catalogs: &[&SeriesCatalog],
    ) -> anyhow::Result<ChartArtifact>;
}
