// =============================================================================
// stocklab — Main Entry Point
// =============================================================================
//
//   stocklab <TICKER> [CSV_PATH]
//
// Opens today's cache entry for TICKER. When nothing is cached (or
// STOCKLAB_OVERWRITE=1) the bars are imported from CSV_PATH. Every default
// indicator is then computed, its latest values logged, and the snapshot
// written back.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stocklab::{AppConfig, CsvSource, FetchRequest, StockRecord};

fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("STOCKLAB_CONFIG").unwrap_or_else(|_| "stocklab.json".to_string());
    let mut config = AppConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Ok(root) = std::env::var("STOCKLAB_CACHE_ROOT") {
        if !root.trim().is_empty() {
            config.cache_root = PathBuf::from(root.trim());
        }
    }

    let overwrite = std::env::var("STOCKLAB_OVERWRITE")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);

    // ── 2. Arguments ─────────────────────────────────────────────────────
    let mut args = std::env::args().skip(1);
    let Some(ticker) = args.next() else {
        bail!("usage: stocklab <TICKER> [CSV_PATH]");
    };
    let csv_path = args.next().map(PathBuf::from);

    info!(
        %ticker,
        cache_root = %config.cache_root.display(),
        overwrite,
        "stocklab starting"
    );

    // ── 3. Open the record and populate it ───────────────────────────────
    let config = Arc::new(config);
    let mut record = StockRecord::new(&ticker, Local::now().date_naive(), None, config.clone());

    let state = record.load(false);
    if let Some(err) = record.last_cache_error() {
        warn!(error = %err, "ignoring unreadable cache snapshot");
    }

    if !state.has_data() || overwrite {
        let Some(path) = csv_path else {
            bail!("no cached data for {ticker} and no CSV_PATH given");
        };
        let source = CsvSource::new(&path);
        let request = FetchRequest::period(config.default_period.clone()).overwrite(overwrite);
        record
            .fetch(&source, request)
            .with_context(|| format!("failed to import {ticker} from {}", path.display()))?;
    }

    // ── 4. Indicators ────────────────────────────────────────────────────
    record.compute_all().context("indicator computation failed")?;

    for catalog in record.catalogs() {
        for (key, value) in catalog.last_values() {
            match value {
                Some(v) => info!(indicator = %catalog.kind(), series = key, value = v, "latest"),
                None => info!(indicator = %catalog.kind(), series = key, "latest undefined"),
            }
        }
    }

    // ── 5. Persist ───────────────────────────────────────────────────────
    let report = record.save().context("failed to save snapshot")?;
    info!(
        state = %record.state(),
        snapshot = %report.snapshot.display(),
        chart = ?report.chart,
        "done"
    );

    Ok(())
}
