use async_trait::async_trait;
use thiserror::Error;

use crate::entry::LogEntry;

#[derive(Debug, Clone, Error)]
pub enum LogRepositoryError {
    #[error("Failed to prepare log storage: {0}")]
    Prepare(String),

    #[error("Failed to save log entry: {0}")]
    Append(String),
}

/// Durable storage for audit entries.
#[async_trait]
pub trait LogRepository: Send + Sync + 'static {
    /// Create the backing table and indexes if they do not exist yet.
    ///
    /// # Errors
    /// * `Prepare` - Schema creation failed
    async fn prepare(&self) -> Result<(), LogRepositoryError>;

    /// Persist one entry.
    ///
    /// # Errors
    /// * `Append` - Write failed
    async fn append(&self, entry: &LogEntry) -> Result<(), LogRepositoryError>;
}
