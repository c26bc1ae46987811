//! `SQLite` implementation of [`RuleRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rulehub_app::ports::RuleRepository;
use rulehub_domain::action::ActionInstance;
use rulehub_domain::condition::Condition;
use rulehub_domain::error::{NotFoundError, RuleHubError};
use rulehub_domain::id::{OrganizationId, RuleId};
use rulehub_domain::rule::AutomationRule;
use rulehub_domain::time::Timestamp;
use rulehub_domain::trigger::TriggerKind;

use crate::error::StorageError;

struct Wrapper(AutomationRule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationRule> {
        value.map(|w| w.0)
    }
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let organization_id: uuid::Uuid = row.try_get("organization_id")?;
        let name: String = row.try_get("name")?;
        let description: String = row.try_get("description")?;
        let trigger_kind: String = row.try_get("trigger_kind")?;
        let conditions_json: String = row.try_get("conditions")?;
        let actions_json: String = row.try_get("actions")?;
        let is_active: bool = row.try_get("is_active")?;
        let execution_count: i64 = row.try_get("execution_count")?;
        let error_count: i64 = row.try_get("error_count")?;
        let last_executed_raw: Option<String> = row.try_get("last_executed")?;
        let last_error: Option<String> = row.try_get("last_error")?;
        let created_at_raw: String = row.try_get("created_at")?;

        let trigger: TriggerKind = trigger_kind
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let conditions: Vec<Condition> = serde_json::from_str(&conditions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let actions: Vec<ActionInstance> = serde_json::from_str(&actions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_executed = last_executed_raw.as_deref().map(parse_timestamp).transpose()?;
        let created_at = parse_timestamp(&created_at_raw)?;

        Ok(Self(AutomationRule {
            id: RuleId::from_uuid(id),
            organization_id: OrganizationId::from_uuid(organization_id),
            name,
            description,
            trigger,
            conditions,
            actions,
            is_active,
            execution_count,
            error_count,
            last_executed,
            last_error,
            created_at,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO rules (
        id, organization_id, name, description, trigger_kind, conditions,
        actions, is_active, execution_count, error_count, last_executed,
        last_error, created_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM rules WHERE id = ?";
const SELECT_BY_ORGANIZATION: &str =
    "SELECT * FROM rules WHERE organization_id = ? ORDER BY created_at DESC";
const SELECT_ACTIVE: &str = r"
    SELECT * FROM rules
    WHERE organization_id = ? AND trigger_kind = ? AND is_active = 1
    ORDER BY created_at
";

// Authoring update: execution metadata is owned by the engine and changes
// only through the atomic increments below.
const UPDATE: &str = r"
    UPDATE rules
    SET name = ?, description = ?, trigger_kind = ?, conditions = ?,
        actions = ?, is_active = ?
    WHERE id = ?
";

const DELETE: &str = "DELETE FROM rules WHERE id = ?";
const SET_ACTIVE: &str = "UPDATE rules SET is_active = ? WHERE id = ?";
const INCREMENT_EXECUTION: &str = r"
    UPDATE rules
    SET execution_count = execution_count + 1, last_executed = ?
    WHERE id = ?
";
const INCREMENT_ERROR: &str = r"
    UPDATE rules
    SET error_count = error_count + 1, last_error = ?
    WHERE id = ?
";

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, RuleHubError> {
        let conditions_json = serde_json::to_string(&rule.conditions).map_err(StorageError::from)?;
        let actions_json = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(rule.id.as_uuid())
            .bind(rule.organization_id.as_uuid())
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger.as_str())
            .bind(&conditions_json)
            .bind(&actions_json)
            .bind(rule.is_active)
            .bind(rule.execution_count)
            .bind(rule.error_count)
            .bind(rule.last_executed.map(|ts| ts.to_rfc3339()))
            .bind(&rule.last_error)
            .bind(rule.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, RuleHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<AutomationRule>, RuleHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_ORGANIZATION)
            .bind(organization_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn list_active(
        &self,
        organization_id: OrganizationId,
        trigger: TriggerKind,
    ) -> Result<Vec<AutomationRule>, RuleHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ACTIVE)
            .bind(organization_id.as_uuid())
            .bind(trigger.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, RuleHubError> {
        let conditions_json = serde_json::to_string(&rule.conditions).map_err(StorageError::from)?;
        let actions_json = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE)
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger.as_str())
            .bind(&conditions_json)
            .bind(&actions_json)
            .bind(rule.is_active)
            .bind(rule.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Rule",
                id: rule.id.to_string(),
            }
            .into());
        }
        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), RuleHubError> {
        sqlx::query(DELETE)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn set_active(&self, id: RuleId, is_active: bool) -> Result<(), RuleHubError> {
        let result = sqlx::query(SET_ACTIVE)
            .bind(is_active)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn increment_execution(&self, id: RuleId, at: Timestamp) -> Result<(), RuleHubError> {
        sqlx::query(INCREMENT_EXECUTION)
            .bind(at.to_rfc3339())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn increment_error(&self, id: RuleId, message: &str) -> Result<(), RuleHubError> {
        sqlx::query(INCREMENT_ERROR)
            .bind(message)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
