//! Error types for the mycc daemon.

/// Top-level error type for the scheduler and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum MyccError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Local agent invocation error (spawn failure, non-zero exit, timeout).
    #[error("agent error: {0}")]
    Agent(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, MyccError>;
