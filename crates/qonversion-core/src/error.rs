//! Error types for Qonversion core types.

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur when decoding Qonversion records.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Webhook payload did not match the event shape.
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(#[from] serde_json::Error),

    /// Event name outside the known lifecycle set.
    #[error("unknown event name: {0}")]
    UnknownEventName(String),

    /// Environment other than `sandbox` or `prod`.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),
}
