//! Error types for the lead intake bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
}

/// Question catalog validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog contains no questions")]
    Empty,

    #[error("Duplicate field key in catalog: {0}")]
    DuplicateFieldKey(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Lead storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open lead store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Operator notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build report mail: {0}")]
    BuildFailed(String),

    #[error("SMTP send failed: {0}")]
    SendFailed(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
