use thiserror::Error;

/// Errors that can occur within the job registry and scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The job payload failed a field check; nothing was changed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No job with the given ID exists in the registry.
    #[error("Job not found: {id}")]
    NotFound { id: String },

    /// The job's previous run has not finished yet.
    #[error("Job already running: {id}")]
    AlreadyRunning { id: String },

    /// The job file could not be written.
    #[error("Store error: {0}")]
    Store(#[from] std::io::Error),

    /// Job records could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
