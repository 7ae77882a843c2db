use thiserror::Error;

/// Top-level error type for Deadliner.
#[derive(Debug, Error)]
pub enum DeadlinerError {
    /// Task or handle persistence error.
    #[error("store error: {0}")]
    Store(String),

    /// Deferred job queue error (schedule, cancel, claim).
    #[error("queue error: {0}")]
    Queue(String),

    /// Notification gateway error.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Rejected user input (duplicate name, bad date, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
