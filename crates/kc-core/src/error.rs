use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`crate::WorkloadDirectory`] implementation.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("workload directory request failed: {0}")]
    Backend(#[source] BoxError),

    #[error("workload directory rejected {op}: {reason}")]
    Rejected { op: &'static str, reason: String },
}

/// Failure reported by a [`crate::CommandChannel`] or [`crate::Connector`].
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("command channel failed: {0}")]
    Backend(#[source] BoxError),

    #[error("command channel is closed")]
    Closed,
}

/// Console payload that could not be decoded into an event record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to decode console event: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("{op} timed out after {ms}ms")]
    Timeout { op: &'static str, ms: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cancelled")]
    Cancelled,
}

impl CoreError {
    /// Connectivity failures are retried; bad configuration and cancellation are not.
    pub fn is_transient(&self) -> bool {
        !matches!(self, CoreError::InvalidConfig(_) | CoreError::Cancelled)
    }
}
