//! `SQLite` implementation of [`TemplateStore`].

use sqlx::SqlitePool;

use rulehub_app::ports::{MessageTemplate, TemplateStore};
use rulehub_domain::error::RuleHubError;

use crate::error::StorageError;

const SELECT: &str = "SELECT id, subject, body FROM message_templates WHERE id = ?";

/// `SQLite`-backed message template store.
pub struct SqliteTemplateStore {
    pool: SqlitePool,
}

impl SqliteTemplateStore {
    /// Create a new template store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TemplateStore for SqliteTemplateStore {
    async fn get(&self, id: &str) -> Result<Option<MessageTemplate>, RuleHubError> {
        let row: Option<(String, Option<String>, String)> = sqlx::query_as(SELECT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|(id, subject, body)| MessageTemplate { id, subject, body }))
    }
}
