//! `SQLite` implementation of [`RecordStore`] — generic row access for the
//! `create_task` and `update_record` actions.
//!
//! Table and column names come from rule configs, so they are validated as
//! plain identifiers before being spliced into SQL; all values go through
//! bound parameters.

use sqlx::SqlitePool;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use rulehub_app::ports::RecordStore;
use rulehub_domain::error::{NotFoundError, RuleHubError};

use crate::error::StorageError;

/// `SQLite`-backed generic record store.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Create a new record store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn ensure_identifier(name: &str) -> Result<(), StorageError> {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if starts_well && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StorageError::InvalidIdentifier(name.to_string()))
    }
}

/// Bind one JSON value as the matching `SQLite` scalar; composites are
/// stored as their JSON text.
fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q serde_json::Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        serde_json::Value::Null => query.bind(None::<String>),
        serde_json::Value::Bool(flag) => query.bind(*flag),
        serde_json::Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                query.bind(integer)
            } else {
                query.bind(number.as_f64())
            }
        }
        serde_json::Value::String(text) => query.bind(text.as_str()),
        composite => query.bind(composite.to_string()),
    }
}

impl RecordStore for SqliteRecordStore {
    async fn insert(
        &self,
        table: &str,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, RuleHubError> {
        ensure_identifier(table).map_err(RuleHubError::from)?;
        for column in fields.keys() {
            ensure_identifier(column).map_err(RuleHubError::from)?;
        }

        let id = uuid::Uuid::new_v4().to_string();
        let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
        let placeholders = vec!["?"; fields.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO {table} (id, {}) VALUES ({placeholders})",
            columns.join(", "),
        );

        let mut query = sqlx::query(&sql).bind(&id);
        for value in fields.values() {
            query = bind_value(query, value);
        }
        query
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(id)
    }

    async fn update(
        &self,
        table: &str,
        record_id: &str,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), RuleHubError> {
        ensure_identifier(table).map_err(RuleHubError::from)?;
        for column in fields.keys() {
            ensure_identifier(column).map_err(RuleHubError::from)?;
        }
        if fields.is_empty() {
            return Err(StorageError::EmptyUpdate.into());
        }

        let assignments: Vec<String> = fields.keys().map(|col| format!("{col} = ?")).collect();
        let sql = format!("UPDATE {table} SET {} WHERE id = ?", assignments.join(", "));

        let mut query = sqlx::query(&sql);
        for value in fields.values() {
            query = bind_value(query, value);
        }
        let result = query
            .bind(record_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Record",
                id: format!("{table}/{record_id}"),
            }
            .into());
        }
        Ok(())
    }
}
