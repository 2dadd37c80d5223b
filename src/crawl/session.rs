// src/crawl/session.rs
// =============================================================================
// One crawl session: the state that lives exactly as long as one traversal.
//
// A session owns:
// - the seed URL (and its domain, the base for scope checks)
// - its reconciled configuration
// - a frontier namespace (its own SQLite file, or an in-memory store)
// - the redirect-chain counter and the "suggested next" slot
// - the output sink and log streams
//
// Storage lives in a per-session directory. A temporary directory is removed
// when the session is closed, and by `TempDir`'s drop if the session is
// dropped some other way. A caller-chosen working directory is kept so a
// later session can resume from it.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::address::{self, UrlComponents};
use crate::config::CrawlConfig;
use crate::error::{Result, SessionError};
use crate::frontier::{Frontier, MemoryFrontier, SqliteFrontier};
use crate::output::{CrawlLog, LogStream, OutputSink};

const FRONTIER_FILE: &str = "frontier.db";

/// The directory a session keeps its frontier in.
#[derive(Debug)]
pub enum SessionStorage {
    /// Removed when released
    Temporary(TempDir),
    /// Kept for resuming
    Persistent(PathBuf),
}

impl SessionStorage {
    /// Creates the session directory.
    ///
    /// Temporary directories are named after the seed domain and start time,
    /// so concurrent sessions never share one.
    pub fn create(work_dir: Option<&Path>, domain: &str) -> Result<Self> {
        match work_dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|source| SessionError::Storage {
                    path: dir.to_path_buf(),
                    source,
                })?;
                Ok(SessionStorage::Persistent(dir.to_path_buf()))
            }
            None => {
                let prefix = format!(
                    "crawl-{}-{}-",
                    sanitize(domain),
                    Utc::now().format("%Y%m%d%H%M%S")
                );
                let dir = tempfile::Builder::new()
                    .prefix(&prefix)
                    .tempdir()
                    .map_err(|source| SessionError::Storage {
                        path: std::env::temp_dir(),
                        source,
                    })?;
                Ok(SessionStorage::Temporary(dir))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SessionStorage::Temporary(dir) => dir.path(),
            SessionStorage::Persistent(path) => path,
        }
    }

    /// Deletes a temporary directory now instead of at drop time.
    pub fn release(self) {
        if let SessionStorage::Temporary(dir) = self {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!(path = %path.display(), "session storage released"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove session storage"),
            }
        }
    }
}

fn sanitize(domain: &str) -> String {
    domain
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '-' })
        .collect()
}

/// State of one traversal.
pub struct Session {
    pub(crate) seed: UrlComponents,
    pub(crate) seed_url: String,
    pub(crate) config: CrawlConfig,
    pub(crate) frontier: Box<dyn Frontier>,
    pub(crate) output: OutputSink,
    pub(crate) log: CrawlLog,
    pub(crate) redirect_count: u32,
    pub(crate) suggested_next: Option<String>,
    // Declared last so the frontier is gone before the directory is removed
    storage: Option<SessionStorage>,
}

impl Session {
    /// Opens a session with a SQLite frontier in its own directory.
    pub async fn open(target: &str, config: CrawlConfig) -> Result<Self> {
        let (seed, config, log) = prepare(target, config)?;

        let storage = SessionStorage::create(config.work_dir.as_deref(), &seed.domain)?;
        let frontier = SqliteFrontier::open(&storage.path().join(FRONTIER_FILE))
            .await
            .map_err(SessionError::from)?;
        debug!(path = %storage.path().display(), "session storage ready");

        Self::assemble(seed, config, log, Box::new(frontier), Some(storage))
    }

    /// Opens a session whose frontier lives only in memory.
    pub fn in_memory(target: &str, config: CrawlConfig) -> Result<Self> {
        Self::with_frontier(target, config, Box::new(MemoryFrontier::new()))
    }

    /// Opens a session around a caller-provided frontier store.
    pub fn with_frontier(
        target: &str,
        config: CrawlConfig,
        frontier: Box<dyn Frontier>,
    ) -> Result<Self> {
        let (seed, config, log) = prepare(target, config)?;
        Self::assemble(seed, config, log, frontier, None)
    }

    fn assemble(
        seed: UrlComponents,
        config: CrawlConfig,
        log: CrawlLog,
        frontier: Box<dyn Frontier>,
        storage: Option<SessionStorage>,
    ) -> Result<Self> {
        let output = OutputSink::open(&config.output_target())?;
        let seed_url = seed.to_string();
        Ok(Self {
            suggested_next: Some(seed_url.clone()),
            seed,
            seed_url,
            config,
            frontier,
            output,
            log,
            redirect_count: 0,
            storage,
        })
    }

    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// The session directory, if the frontier is on disk.
    pub fn storage_path(&self) -> Option<&Path> {
        self.storage.as_ref().map(SessionStorage::path)
    }

    /// Flushes output, closes the frontier and releases storage.
    ///
    /// Storage is released even when flushing fails; the flush error is
    /// returned afterwards.
    pub async fn close(mut self) -> Result<()> {
        let flushed = self.output.flush();
        self.frontier.close().await;
        if let Some(storage) = self.storage.take() {
            storage.release();
        }
        flushed
    }
}

// Parses the seed, reconciles the config against it and opens the log
fn prepare(target: &str, mut config: CrawlConfig) -> Result<(UrlComponents, CrawlConfig, CrawlLog)> {
    let seed_url = config.seed_url(target);
    let seed = address::parse(&seed_url)
        .filter(|seed| !seed.host.is_empty())
        .map(|seed| address::resolve(&seed, &seed))
        .ok_or_else(|| SessionError::InvalidSeed(seed_url.clone()))?;

    let notes = config.reconcile(&seed);
    let log = CrawlLog::open(config.log_dir.as_deref(), config.log_format)?;
    for note in &notes {
        log.record(LogStream::General, &["config", note]);
    }

    Ok((seed, config, log))
}
