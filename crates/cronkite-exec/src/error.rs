//! Error types for the cronkite-exec crate.

use thiserror::Error;

/// All errors that can originate from launching a job process.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The child process could not be spawned.
    #[error("Failed to start: {0}")]
    Spawn(String),

    /// The child exceeded the configured time budget and was killed.
    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Underlying I/O failure while waiting on the child.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ExecError>;
