// =============================================================================
// StockRecord — one ticker, one cache key, one OHLCV frame
// =============================================================================
//
// Lifecycle:
//
//   Created ──load──> Loaded | Empty
//        │                  │
//        └────fetch─────────┴──> Fetched (first data) | Refreshed (overwrite)
//                                   │
//                                 save ──> Persisted
//
// The frame is owned by the record alone. The cache manager only hands frames
// back and writes copies of them; catalogs computed from a frame are dropped
// whenever the frame is replaced.
// =============================================================================

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::cache::{plan_fetch, CacheKey, CacheManager, CacheProbe, FetchPlan, SaveReport};
use crate::config::AppConfig;
use crate::error::{Error, FetchError, Result};
use crate::indicators::{IndicatorInput, IndicatorSpec, SeriesCatalog};
use crate::market_data::{pct_change, Column, FetchRequest, MarketDataSource, OhlcvFrame};
use crate::render::{ChartArtifact, ChartRenderer};
use crate::types::IndicatorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordState {
    /// Ticker bound, nothing probed yet.
    Created,
    /// Probe found nothing usable (absent, corrupt or skipped).
    Empty,
    /// Frame came from the cache snapshot.
    Loaded,
    /// Frame came from the first fetch of this record.
    Fetched,
    /// Frame replaced an existing one through an overwrite fetch.
    Refreshed,
    /// Frame written back to the cache.
    Persisted,
}

impl RecordState {
    pub fn has_data(self) -> bool {
        !matches!(self, RecordState::Created | RecordState::Empty)
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Empty => write!(f, "empty"),
            Self::Loaded => write!(f, "loaded"),
            Self::Fetched => write!(f, "fetched"),
            Self::Refreshed => write!(f, "refreshed"),
            Self::Persisted => write!(f, "persisted"),
        }
    }
}

/// Options for [`StockRecord::load_or_fetch`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Do not read the snapshot at all.
    pub skip_load: bool,
    /// Fetch request applied after the probe, if any.
    pub fetch: Option<FetchRequest>,
}

pub struct StockRecord {
    ticker: String,
    config: Arc<AppConfig>,
    cache: CacheManager,
    store: Option<OhlcvFrame>,
    state: RecordState,
    last_cache_error: Option<Error>,
    catalogs: IndexMap<IndicatorKind, SeriesCatalog>,
    chart: Option<ChartArtifact>,
}

impl StockRecord {
    pub fn new(
        ticker: impl Into<String>,
        as_of: NaiveDate,
        intraday: Option<&str>,
        config: Arc<AppConfig>,
    ) -> Self {
        let ticker = ticker.into().trim().to_string();
        let key = CacheKey::new(ticker.clone(), as_of, intraday);
        let cache = CacheManager::new(&config.cache_root, key);
        debug!(key = %cache.key(), root = %cache.root().display(), "stock record created");

        Self {
            ticker,
            config,
            cache,
            store: None,
            state: RecordState::Created,
            last_cache_error: None,
            catalogs: IndexMap::new(),
            chart: None,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn cache_key(&self) -> &CacheKey {
        self.cache.key()
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The corrupt-snapshot error recorded by the last probe, if any.
    pub fn last_cache_error(&self) -> Option<&Error> {
        self.last_cache_error.as_ref()
    }

    pub fn data(&self) -> Option<&OhlcvFrame> {
        self.store.as_ref()
    }

    pub fn chart(&self) -> Option<&ChartArtifact> {
        self.chart.as_ref()
    }

    fn frame(&self) -> Result<&OhlcvFrame> {
        self.store
            .as_ref()
            .ok_or_else(|| Error::not_ready(self.ticker.clone()))
    }

    pub fn column(&self, column: Column) -> Result<&[f64]> {
        Ok(self.frame()?.column(column))
    }

    pub fn open(&self) -> Result<&[f64]> {
        self.column(Column::Open)
    }

    pub fn high(&self) -> Result<&[f64]> {
        self.column(Column::High)
    }

    pub fn low(&self) -> Result<&[f64]> {
        self.column(Column::Low)
    }

    pub fn close(&self) -> Result<&[f64]> {
        self.column(Column::Close)
    }

    pub fn volume(&self) -> Result<&[f64]> {
        self.column(Column::Volume)
    }

    // -------------------------------------------------------------------------
    // Load / fetch
    // -------------------------------------------------------------------------

    /// Probe the cache and bind whatever it holds.
    pub fn load(&mut self, skip_load: bool) -> RecordState {
        self.last_cache_error = None;

        match self.cache.probe(skip_load) {
            CacheProbe::Loaded(frame) => self.replace_store(frame, RecordState::Loaded),
            CacheProbe::Skipped | CacheProbe::Missing => self.clear_store(),
            CacheProbe::Corrupt(err) => {
                self.clear_store();
                self.last_cache_error = Some(err);
            }
        }
        self.state
    }

    /// Probe, then apply the optional fetch request.
    pub fn load_or_fetch(
        &mut self,
        source: &dyn MarketDataSource,
        options: LoadOptions,
    ) -> Result<RecordState> {
        self.load(options.skip_load);
        if let Some(request) = options.fetch {
            self.fetch(source, request)?;
        }
        Ok(self.state)
    }

    /// Fetch from `source` according to `request`, then persist the result.
    ///
    /// Without `overwrite`, already held data is returned as is and the
    /// source is not called.
    pub fn fetch(
        &mut self,
        source: &dyn MarketDataSource,
        request: FetchRequest,
    ) -> Result<&OhlcvFrame> {
        self.fetch_as_of(source, request, Utc::now().date_naive())
    }

    fn fetch_as_of(
        &mut self,
        source: &dyn MarketDataSource,
        request: FetchRequest,
        today: NaiveDate,
    ) -> Result<&OhlcvFrame> {
        let window = request.validate(today)?;
        let interval = request
            .interval
            .clone()
            .unwrap_or_else(|| self.config.default_interval.clone());

        let has_rows = self.store.as_ref().is_some_and(|f| !f.is_empty());
        let next_state = match plan_fetch(has_rows, request.overwrite) {
            FetchPlan::ReuseLoaded => {
                debug!(ticker = %self.ticker, state = %self.state, "fetch skipped; reusing held data");
                return self.frame();
            }
            FetchPlan::Fetch { discard_existing } => {
                if discard_existing {
                    info!(ticker = %self.ticker, "overwrite requested; discarding held data");
                    self.clear_store();
                    RecordState::Refreshed
                } else {
                    RecordState::Fetched
                }
            }
        };

        info!(ticker = %self.ticker, %window, %interval, "fetching market data");
        let mut bars = source.fetch(&self.ticker, &window, &interval)?;
        if bars.is_empty() {
            return Err(FetchError::NoData {
                ticker: self.ticker.clone(),
            }
            .into());
        }
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);

        let frame = OhlcvFrame::from_bars(bars)?;
        info!(ticker = %self.ticker, rows = frame.len(), "market data fetched");

        self.cache.write_snapshot(&frame)?;
        self.replace_store(frame, next_state);
        self.frame()
    }

    fn replace_store(&mut self, frame: OhlcvFrame, state: RecordState) {
        self.store = Some(frame);
        self.catalogs.clear();
        self.chart = None;
        self.state = state;
    }

    fn clear_store(&mut self) {
        self.store = None;
        self.catalogs.clear();
        self.chart = None;
        self.state = RecordState::Empty;
    }

    // -------------------------------------------------------------------------
    // Indicators
    // -------------------------------------------------------------------------

    /// Compute one indicator on the held frame and keep its catalog,
    /// replacing any earlier catalog of the same kind.
    pub fn compute_indicator(&mut self, spec: IndicatorSpec) -> Result<&SeriesCatalog> {
        let catalog = {
            let frame = self.frame()?;
            spec.compute(&IndicatorInput::new(frame)?, &self.config.styles)?
        };
        Ok(self.keep_catalog(catalog))
    }

    /// Like [`compute_indicator`](Self::compute_indicator) but with `source`
    /// standing in for the close column.
    pub fn compute_indicator_with_source(
        &mut self,
        spec: IndicatorSpec,
        source: &[f64],
    ) -> Result<&SeriesCatalog> {
        let catalog = {
            let frame = self.frame()?;
            spec.compute(&IndicatorInput::with_source(frame, source)?, &self.config.styles)?
        };
        Ok(self.keep_catalog(catalog))
    }

    /// Compute every indicator kind with its configured defaults.
    pub fn compute_all(&mut self) -> Result<()> {
        for kind in IndicatorKind::ALL {
            let spec = IndicatorSpec::defaults(kind, &self.config.indicators);
            self.compute_indicator(spec)?;
        }
        Ok(())
    }

    fn keep_catalog(&mut self, catalog: SeriesCatalog) -> &SeriesCatalog {
        let kind = catalog.kind();
        debug!(ticker = %self.ticker, %kind, "indicator computed");
        self.chart = None;
        self.catalogs.insert(kind, catalog);
        &self.catalogs[&kind]
    }

    pub fn indicator(&self, kind: IndicatorKind) -> Option<&SeriesCatalog> {
        self.catalogs.get(&kind)
    }

    pub fn catalogs(&self) -> impl Iterator<Item = &SeriesCatalog> {
        self.catalogs.values()
    }

    // -------------------------------------------------------------------------
    // Percentage change
    // -------------------------------------------------------------------------

    pub fn percentage_change(&self, column: Column) -> Result<Vec<f64>> {
        Ok(pct_change(self.column(column)?))
    }

    /// Percentage change of every column, same index.
    pub fn percentage_change_table(&self) -> Result<OhlcvFrame> {
        Ok(self.frame()?.pct_change())
    }

    /// Percentage change of an arbitrary series (e.g. an indicator output).
    pub fn percentage_change_of(series: &[f64]) -> Vec<f64> {
        pct_change(series)
    }

    // -------------------------------------------------------------------------
    // Render / save
    // -------------------------------------------------------------------------

    /// Render the frame and every computed catalog. The chart is kept until
    /// the frame is replaced or an indicator is (re)computed.
    pub fn render_chart(&mut self, renderer: &dyn ChartRenderer) -> anyhow::Result<&ChartArtifact> {
        let artifact = {
            let frame = self.frame()?;
            let catalogs: Vec<&SeriesCatalog> = self.catalogs.values().collect();
            renderer.render(&self.ticker, frame, &catalogs)?
        };
        Ok(self.chart.insert(artifact))
    }

    /// Write the snapshot and, if one was rendered, the chart.
    pub fn save(&mut self) -> Result<SaveReport> {
        let report = {
            let frame = self.frame()?;
            self.cache.save(frame, self.chart.as_ref())?
        };
        if let crate::cache::ChartSave::Failed(reason) = &report.chart {
            warn!(ticker = %self.ticker, %reason, "snapshot saved without chart");
        }
        self.state = RecordState::Persisted;
        Ok(report)
    }

    /// Move this record's cache entry under `root` and save there. Later
    /// loads and saves use the new root as well.
    pub fn save_to(&mut self, root: impl AsRef<Path>) -> Result<SaveReport> {
        self.frame()?;
        self.cache.rebase(root);
        info!(ticker = %self.ticker, root = %self.cache.root().display(), "cache root moved");
        self.save()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ChartSave;
    use crate::indicators::Rsi;
    use crate::market_data::{Bar, FetchWindow};
    use chrono::TimeZone;
    use std::cell::{Cell, RefCell};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 29).unwrap()
    }

    fn bars(n: usize, base: f64) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = base + (i as f64 * 0.5).sin() * 3.0 + i as f64 * 0.1;
                Bar {
                    timestamp: Utc.timestamp_opt(1_704_067_200 + i as i64 * 86_400, 0).unwrap(),
                    open: c - 0.5,
                    high: c + 1.5,
                    low: c - 1.5,
                    close: c,
                    volume: 10_000.0 + i as f64,
                }
            })
            .collect()
    }

    /// Counts calls and answers with a fixed set of bars (or an error).
    struct FakeSource {
        calls: Cell<usize>,
        bars: Vec<Bar>,
        fail: bool,
        seen: RefCell<Option<(FetchWindow, String)>>,
    }

    impl FakeSource {
        fn with(bars: Vec<Bar>) -> Self {
            Self {
                calls: Cell::new(0),
                bars,
                fail: false,
                seen: RefCell::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with(Vec::new())
            }
        }
    }

    impl MarketDataSource for FakeSource {
        fn fetch(
            &self,
            ticker: &str,
            window: &FetchWindow,
            interval: &str,
        ) -> std::result::Result<Vec<Bar>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            *self.seen.borrow_mut() = Some((window.clone(), interval.to_string()));
            if self.fail {
                return Err(FetchError::Transport(format!("{ticker}: connection reset")));
            }
            Ok(self.bars.clone())
        }
    }

    struct FixedRenderer;

    impl ChartRenderer for FixedRenderer {
        fn render(
            &self,
            ticker: &str,
            frame: &OhlcvFrame,
            catalogs: &[&SeriesCatalog],
        ) -> anyhow::Result<ChartArtifact> {
            Ok(ChartArtifact::from_svg(format!(
                "<svg data-ticker=\"{ticker}\" data-rows=\"{}\" data-panels=\"{}\"/>",
                frame.len(),
                catalogs.len()
            )))
        }
    }

    fn record(dir: &tempfile::TempDir) -> StockRecord {
        let config = AppConfig {
            cache_root: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        StockRecord::new("SAN.PA", today(), None, Arc::new(config))
    }

    fn year() -> FetchRequest {
        FetchRequest::period("1y")
    }

    #[test]
    fn new_record_has_no_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        assert_eq!(rec.state(), RecordState::Created);
        assert!(matches!(rec.close(), Err(Error::DataNotReady { .. })));
        assert!(matches!(
            rec.compute_indicator(IndicatorSpec::Rsi(Rsi::default())),
            Err(Error::DataNotReady { .. })
        ));
        assert!(matches!(rec.save(), Err(Error::DataNotReady { .. })));
    }

    #[test]
    fn missing_snapshot_leaves_record_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        assert_eq!(rec.load(false), RecordState::Empty);
        assert!(rec.last_cache_error().is_none());
        assert!(rec.data().is_none());
    }

    #[test]
    fn first_fetch_persists_and_reload_finds_it() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FakeSource::with(bars(40, 50.0));

        let mut rec = record(&dir);
        rec.load(false);
        rec.fetch(&source, year()).unwrap();
        assert_eq!(rec.state(), RecordState::Fetched);
        assert_eq!(source.calls.get(), 1);
        assert!(rec.cache().paths().json_file.exists());

        let mut again = record(&dir);
        assert_eq!(again.load(false), RecordState::Loaded);
        assert_eq!(again.data(), rec.data());
    }

    #[test]
    fn no_overwrite_reuses_valid_snapshot_without_fetching() {
        let dir = tempfile::TempDir::new().unwrap();
        record(&dir)
            .fetch(&FakeSource::with(bars(30, 20.0)), year())
            .unwrap();

        let source = FakeSource::with(bars(5, 999.0));
        let mut rec = record(&dir);
        let state = rec
            .load_or_fetch(
                &source,
                LoadOptions {
                    skip_load: false,
                    fetch: Some(year()),
                },
            )
            .unwrap();
        assert_eq!(state, RecordState::Loaded);
        assert_eq!(source.calls.get(), 0);
        assert_eq!(rec.data().unwrap().len(), 30);
    }

    #[test]
    fn overwrite_always_fetches_and_replaces_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        record(&dir)
            .fetch(&FakeSource::with(bars(30, 20.0)), year())
            .unwrap();

        let source = FakeSource::with(bars(12, 80.0));
        let mut rec = record(&dir);
        rec.load(false);
        rec.compute_indicator(IndicatorSpec::Rsi(Rsi { n: 3 })).unwrap();
        rec.fetch(&source, year().overwrite(true)).unwrap();

        assert_eq!(source.calls.get(), 1);
        assert_eq!(rec.state(), RecordState::Refreshed);
        assert_eq!(rec.data().unwrap().len(), 12);
        assert!(rec.indicator(IndicatorKind::Rsi).is_none());

        let mut reread = record(&dir);
        reread.load(false);
        assert_eq!(reread.data().unwrap().len(), 12);
    }

    #[test]
    fn period_and_start_together_is_rejected_before_fetching() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FakeSource::with(bars(10, 1.0));
        let mut rec = record(&dir);
        let both = FetchRequest {
            period: Some("1mo".into()),
            start: Some(today()),
            ..FetchRequest::default()
        };
        assert!(matches!(rec.fetch(&source, both), Err(Error::Validation(_))));
        assert!(matches!(
            rec.fetch(&source, FetchRequest::default()),
            Err(Error::Validation(_))
        ));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn range_without_end_runs_to_today_with_default_interval() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FakeSource::with(bars(10, 1.0));
        let mut rec = record(&dir);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        rec.fetch_as_of(&source, FetchRequest::range(start, None), today())
            .unwrap();
        let (window, interval) = source.seen.borrow().clone().unwrap();
        assert_eq!(window, FetchWindow::Range { start, end: today() });
        assert_eq!(interval, "1d");
    }

    #[test]
    fn corrupt_snapshot_is_recorded_not_hidden() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.cache().paths().ensure_dirs().unwrap();
        std::fs::write(&rec.cache().paths().json_file, "[1, 2,").unwrap();

        assert_eq!(rec.load(false), RecordState::Empty);
        assert!(matches!(
            rec.last_cache_error(),
            Some(Error::CacheCorrupt { .. })
        ));

        let source = FakeSource::with(bars(10, 1.0));
        rec.fetch(&source, year()).unwrap();
        assert_eq!(rec.state(), RecordState::Fetched);
    }

    #[test]
    fn snapshot_without_rows_does_not_block_fetching() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.cache().paths().ensure_dirs().unwrap();
        std::fs::write(
            &rec.cache().paths().json_file,
            r#"{"Open":{},"High":{},"Low":{},"Close":{},"Volume":{}}"#,
        )
        .unwrap();

        assert_eq!(rec.load(false), RecordState::Empty);
        assert!(rec.last_cache_error().is_some());

        let source = FakeSource::with(bars(20, 5.0));
        rec.fetch(&source, year()).unwrap();
        assert_eq!(source.calls.get(), 1);
        assert_eq!(rec.state(), RecordState::Fetched);
        assert!(rec
            .compute_indicator(IndicatorSpec::Rsi(Rsi { n: 3 }))
            .is_ok());
    }

    #[test]
    fn skip_load_ignores_existing_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        record(&dir)
            .fetch(&FakeSource::with(bars(10, 1.0)), year())
            .unwrap();

        let mut rec = record(&dir);
        assert_eq!(rec.load(true), RecordState::Empty);
        assert!(rec.data().is_none());
    }

    #[test]
    fn fetch_failure_propagates() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        let err = rec.fetch(&FakeSource::failing(), year()).unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Transport(_))));
        assert!(rec.data().is_none());
        assert!(!rec.cache().paths().json_file.exists());
    }

    #[test]
    fn empty_answer_is_no_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        let err = rec.fetch(&FakeSource::with(Vec::new()), year()).unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::NoData { .. })));
    }

    #[test]
    fn recompute_replaces_catalog_of_same_kind() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(40, 30.0)), year()).unwrap();

        rec.compute_indicator(IndicatorSpec::Rsi(Rsi { n: 14 })).unwrap();
        let slow = rec.indicator(IndicatorKind::Rsi).unwrap().get("RSI").unwrap().warmup();
        rec.compute_indicator(IndicatorSpec::Rsi(Rsi { n: 3 })).unwrap();
        let fast = rec.indicator(IndicatorKind::Rsi).unwrap().get("RSI").unwrap().warmup();

        assert_eq!(rec.catalogs().count(), 1);
        assert_eq!(slow, 14);
        assert_eq!(fast, 3);
    }

    #[test]
    fn compute_all_fills_every_kind() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(60, 30.0)), year()).unwrap();
        rec.compute_all().unwrap();
        for kind in IndicatorKind::ALL {
            assert!(rec.indicator(kind).is_some(), "{kind} missing");
        }
    }

    #[test]
    fn source_override_must_align() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(20, 30.0)), year()).unwrap();
        let open = rec.open().unwrap().to_vec();
        assert!(rec
            .compute_indicator_with_source(IndicatorSpec::Rsi(Rsi { n: 3 }), &open)
            .is_ok());
        assert!(matches!(
            rec.compute_indicator_with_source(IndicatorSpec::Rsi(Rsi { n: 3 }), &open[1..]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn percentage_change_first_row_undefined() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(5, 30.0)), year()).unwrap();

        let close = rec.close().unwrap().to_vec();
        let pc = rec.percentage_change(Column::Close).unwrap();
        assert!(pc[0].is_nan());
        assert!((pc[1] - (close[1] / close[0] - 1.0)).abs() < 1e-12);

        let table = rec.percentage_change_table().unwrap();
        assert_eq!(table.index(), rec.data().unwrap().index());
        assert_eq!(table.close()[1], pc[1]);

        let custom = StockRecord::percentage_change_of(&[2.0, 3.0, 1.5]);
        assert!(custom[0].is_nan());
        assert_eq!(&custom[1..], &[0.5, -0.5]);
    }

    #[test]
    fn save_without_chart_succeeds() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(10, 1.0)), year()).unwrap();
        let report = rec.save().unwrap();
        assert_eq!(report.chart, ChartSave::Skipped);
        assert_eq!(rec.state(), RecordState::Persisted);
    }

    #[test]
    fn chart_survives_save_but_not_recompute() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(40, 10.0)), year()).unwrap();
        rec.render_chart(&FixedRenderer).unwrap();

        rec.save().unwrap();
        assert!(rec.chart().is_some());

        rec.compute_indicator(IndicatorSpec::Rsi(Rsi { n: 3 })).unwrap();
        assert!(rec.chart().is_none());
    }

    #[test]
    fn save_to_writes_under_another_root_and_keeps_it() {
        let dir = tempfile::TempDir::new().unwrap();
        let elsewhere = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(10, 1.0)), year()).unwrap();

        let report = rec.save_to(elsewhere.path()).unwrap();
        assert!(report.snapshot.starts_with(elsewhere.path()));
        assert!(report.snapshot.ends_with("SAN-PA/2024-03-29/json/SAN-PA.json"));
        assert_eq!(rec.state(), RecordState::Persisted);
        assert_eq!(rec.cache().root(), elsewhere.path());

        let again = rec.save().unwrap();
        assert_eq!(again.snapshot, report.snapshot);
    }

    #[test]
    fn save_to_without_data_leaves_root_alone() {
        let dir = tempfile::TempDir::new().unwrap();
        let elsewhere = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        assert!(matches!(
            rec.save_to(elsewhere.path()),
            Err(Error::DataNotReady { .. })
        ));
        assert_eq!(rec.cache().root(), dir.path());
    }

    #[test]
    fn rendered_chart_is_saved_next_to_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut rec = record(&dir);
        rec.fetch(&FakeSource::with(bars(60, 10.0)), year()).unwrap();
        rec.compute_all().unwrap();
        let svg = rec.render_chart(&FixedRenderer).unwrap().as_svg().to_string();
        assert!(svg.contains("data-panels=\"5\""));

        let report = rec.save().unwrap();
        let ChartSave::Written(path) = report.chart else {
            panic!("chart was not written");
        };
        assert!(path.ends_with("SAN-PA/2024-03-29/svg/SAN-PA.svg"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), svg);
    }
}
