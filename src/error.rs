//! Error types shared across the synchronization pipeline.
//!
//! Most failures are recovered where they happen (a file or asset is skipped and logged), so
//! these variants mostly surface from setup: locating the source tree, loading configuration,
//! building the renderer, or taking the run guard.

use crate::store::StoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while preparing or running a synchronization pass.
#[derive(Debug, Error)]
pub enum Error {
    /// A filesystem operation on `path` failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The chosen directory lacks the sentinel that marks a source tree root.
    #[error("{} is not a source tree root (missing `{marker}`)", root.display())]
    NotSourceTree {
        /// Directory that was offered as root.
        root: PathBuf,
        /// Name of the expected sentinel entry.
        marker: String,
    },
    /// Another pass holds the run guard for this tree.
    #[error("a synchronization is already running (lock file {})", .0.display())]
    RunInProgress(PathBuf),
    /// The markdown renderer could not be initialised.
    #[error("markdown renderer unavailable: {0}")]
    Renderer(String),
    /// A configuration file exists but could not be parsed.
    #[error("invalid configuration in {}: {message}", path.display())]
    Config {
        /// Configuration file path.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// A source document no longer matches what the rendered tree described.
    #[error("{}: {message}", path.display())]
    Document {
        /// Source document path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
    /// The collection store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
