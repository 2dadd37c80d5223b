// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// Only infrastructure failures are errors here. A malformed link, a redirect
// loop or a hook asking to stop are ordinary crawl events and never show up
// as an Err value.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the durable frontier store.
#[derive(Error, Debug)]
pub enum FrontierError {
    /// The SQLite store rejected a query or could not be opened.
    #[error("frontier database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures that stop a crawl session from starting or continuing.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The seed could not be parsed into a crawlable URL.
    #[error("invalid seed URL '{0}'")]
    InvalidSeed(String),

    /// The session working directory could not be created.
    #[error("failed to prepare session storage under {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file or a log stream could not be opened or written.
    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The frontier store failed mid-crawl.
    #[error(transparent)]
    Frontier(#[from] FrontierError),
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
