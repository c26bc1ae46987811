//! Storage-specific error type wrapping sqlx errors.

use rulehub_domain::error::RuleHubError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize a stored JSON value.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A caller-supplied table or column name is not a safe identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// An update was requested with no fields to set.
    #[error("update with no fields")]
    EmptyUpdate,
}

impl From<StorageError> for RuleHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
