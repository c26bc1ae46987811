//! `SQLite` implementation of [`LogStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rulehub_app::ports::LogStore;
use rulehub_domain::error::RuleHubError;
use rulehub_domain::id::{LogId, RuleId};
use rulehub_domain::log::{ActionResult, ExecutionLog};
use rulehub_domain::trigger::TriggerKind;

use crate::error::StorageError;

struct Wrapper(ExecutionLog);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let rule_id: uuid::Uuid = row.try_get("rule_id")?;
        let trigger_event: String = row.try_get("trigger_event")?;
        let context_json: String = row.try_get("context")?;
        let conditions_met: bool = row.try_get("conditions_met")?;
        let actions_json: String = row.try_get("actions_executed")?;
        let results_json: String = row.try_get("results")?;
        let error: Option<String> = row.try_get("error")?;
        let executed_at_raw: String = row.try_get("executed_at")?;

        let trigger_event: TriggerKind = trigger_event
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let context: serde_json::Value = serde_json::from_str(&context_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let actions_executed = serde_json::from_str(&actions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let results: Vec<ActionResult> = serde_json::from_str(&results_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let executed_at = chrono::DateTime::parse_from_rfc3339(&executed_at_raw)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(ExecutionLog {
            id: LogId::from_uuid(id),
            rule_id: RuleId::from_uuid(rule_id),
            trigger_event,
            context,
            conditions_met,
            actions_executed,
            results,
            error,
            executed_at,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO execution_logs (
        id, rule_id, trigger_event, context, conditions_met,
        actions_executed, results, error, executed_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_RULE: &str = r"
    SELECT * FROM execution_logs
    WHERE rule_id = ?
    ORDER BY executed_at DESC
    LIMIT ?
";

/// `SQLite`-backed, append-only execution log store.
pub struct SqliteLogStore {
    pool: SqlitePool,
}

impl SqliteLogStore {
    /// Create a new log store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LogStore for SqliteLogStore {
    async fn append(&self, log: ExecutionLog) -> Result<ExecutionLog, RuleHubError> {
        let context_json = serde_json::to_string(&log.context).map_err(StorageError::from)?;
        let actions_json =
            serde_json::to_string(&log.actions_executed).map_err(StorageError::from)?;
        let results_json = serde_json::to_string(&log.results).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(log.id.as_uuid())
            .bind(log.rule_id.as_uuid())
            .bind(log.trigger_event.as_str())
            .bind(&context_json)
            .bind(log.conditions_met)
            .bind(&actions_json)
            .bind(&results_json)
            .bind(&log.error)
            .bind(log.executed_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(log)
    }

    async fn find_by_rule(
        &self,
        rule_id: RuleId,
        limit: usize,
    ) -> Result<Vec<ExecutionLog>, RuleHubError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_RULE)
            .bind(rule_id.as_uuid())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
