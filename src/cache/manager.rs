// =============================================================================
// Cache Manager — load / fetch / skip decisions and persistence
// =============================================================================
//
// Probe outcomes:
//   skip-load set          => Skipped   (disk untouched)
//   snapshot absent        => Missing   (benign, caller may fetch)
//   snapshot parses        => Loaded
//   snapshot unreadable    => Corrupt   (carries the error for the caller)
//
// Fetch policy:
//   overwrite = true   => always fetch, discarding whatever is held
//   overwrite = false  => reuse held data, fetch only when nothing is held
//
// The manager never keeps the frame; it hands it back to the record.
// =============================================================================

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::key::{CacheKey, CachePaths};
use crate::cache::snapshot;
use crate::error::{Error, Result};
use crate::market_data::OhlcvFrame;
use crate::render::ChartArtifact;

/// Result of looking for a snapshot on disk.
#[derive(Debug)]
pub enum CacheProbe {
    Skipped,
    Missing,
    Loaded(OhlcvFrame),
    Corrupt(Error),
}

/// What a fetch request should do given the data already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    ReuseLoaded,
    Fetch { discard_existing: bool },
}

/// Decide whether a fetch request calls the external source.
pub fn plan_fetch(has_data: bool, overwrite: bool) -> FetchPlan {
    match (has_data, overwrite) {
        (true, false) => FetchPlan::ReuseLoaded,
        (true, true) => FetchPlan::Fetch {
            discard_existing: true,
        },
        (false, _) => FetchPlan::Fetch {
            discard_existing: false,
        },
    }
}

/// What happened to the chart half of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartSave {
    Written(PathBuf),
    /// Nothing has been rendered yet.
    Skipped,
    /// The write failed; the snapshot is still saved.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub snapshot: PathBuf,
    pub chart: ChartSave,
}

/// Resolves one cache key to disk and reads / writes its content.
#[derive(Debug, Clone)]
pub struct CacheManager {
    root: PathBuf,
    key: CacheKey,
    paths: CachePaths,
}

impl CacheManager {
    pub fn new(root: impl AsRef<Path>, key: CacheKey) -> Self {
        let root = root.as_ref().to_path_buf();
        let paths = key.resolve(&root);
        Self { root, key, paths }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Point this manager at another root; subsequent reads and writes use it.
    pub fn rebase(&mut self, root: impl AsRef<Path>) {
        self.root = root.as_ref().to_path_buf();
        self.paths = self.key.resolve(&self.root);
    }

    /// Look for the snapshot of this key.
    pub fn probe(&self, skip_load: bool) -> CacheProbe {
        if skip_load {
            debug!(key = %self.key, "cache probe skipped");
            return CacheProbe::Skipped;
        }

        let path = &self.paths.json_file;
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(key = %self.key, path = %path.display(), "no cached snapshot");
                return CacheProbe::Missing;
            }
            Err(e) => {
                return self.corrupt(format!("unreadable: {e}"));
            }
        };

        match snapshot::decode(&text) {
            Ok(frame) => {
                info!(
                    key = %self.key,
                    rows = frame.len(),
                    path = %path.display(),
                    "snapshot loaded"
                );
                CacheProbe::Loaded(frame)
            }
            Err(reason) => self.corrupt(reason),
        }
    }

    fn corrupt(&self, reason: String) -> CacheProbe {
        let path = self.paths.json_file.clone();
        warn!(key = %self.key, path = %path.display(), %reason, "cached snapshot is corrupt");
        CacheProbe::Corrupt(Error::CacheCorrupt { path, reason })
    }

    /// Write the full frame, replacing any previous snapshot for this key.
    pub fn write_snapshot(&self, frame: &OhlcvFrame) -> Result<PathBuf> {
        let path = self.paths.json_file.clone();
        let persistence = |source: std::io::Error| Error::Persistence {
            path: path.clone(),
            source,
        };

        self.paths.ensure_dirs().map_err(persistence)?;
        let text = snapshot::encode(frame)
            .map_err(|e| persistence(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        snapshot::write_atomic(&path, &text).map_err(persistence)?;

        info!(key = %self.key, rows = frame.len(), path = %path.display(), "snapshot written");
        Ok(path)
    }

    /// Best-effort chart write. Never fails the caller.
    pub fn write_chart(&self, chart: Option<&ChartArtifact>) -> ChartSave {
        let Some(chart) = chart else {
            debug!(key = %self.key, "no chart rendered; skipping image");
            return ChartSave::Skipped;
        };

        let path = &self.paths.svg_file;
        let result = self
            .paths
            .ensure_dirs()
            .and_then(|()| std::fs::write(path, chart.as_svg()));

        match result {
            Ok(()) => {
                info!(key = %self.key, path = %path.display(), "chart written");
                ChartSave::Written(path.clone())
            }
            Err(e) => {
                warn!(key = %self.key, path = %path.display(), error = %e, "chart write failed");
                ChartSave::Failed(e.to_string())
            }
        }
    }

    /// Snapshot (must succeed) then chart (best effort).
    pub fn save(&self, frame: &OhlcvFrame, chart: Option<&ChartArtifact>) -> Result<SaveReport> {
        let snapshot = self.write_snapshot(frame)?;
        let chart = self.write_chart(chart);
        Ok(SaveReport { snapshot, chart })
    }
}
