//! Events — raw change-feed items and their normalized trigger form.

use serde::{Deserialize, Serialize};

use crate::id::OrganizationId;
use crate::trigger::TriggerKind;

/// Row operation reported by the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOperation {
    Insert,
    Update,
}

/// A raw change-data-capture event for one domain table row.
///
/// `new` is the row after the change; `old` is present for updates when the
/// feed provides the previous row image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Source table, e.g. `"bottles"`.
    pub table: String,
    pub operation: ChangeOperation,
    pub new: serde_json::Value,
    #[serde(default)]
    pub old: Option<serde_json::Value>,
}

/// A normalized domain event: canonical trigger id plus row images and the
/// owning organization, ready for rule matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub trigger: TriggerKind,
    pub new_data: serde_json::Value,
    pub old_data: Option<serde_json::Value>,
    pub organization_id: OrganizationId,
}

/// The data bag visible to conditions and action templating for one rule
/// invocation.
///
/// Serializes with camelCase keys so condition fields and placeholders read
/// `newData.status`, `oldData.status`, `organizationId`, `trigger`.
/// Transient; never persisted except as a snapshot inside execution logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    pub trigger: TriggerKind,
    pub new_data: serde_json::Value,
    pub old_data: Option<serde_json::Value>,
    pub organization_id: OrganizationId,
}

impl ExecutionContext {
    /// Snapshot this context as a JSON object for path lookups and logging.
    #[must_use]
    pub fn as_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl From<TriggerEvent> for ExecutionContext {
    fn from(event: TriggerEvent) -> Self {
        Self {
            trigger: event.trigger,
            new_data: event.new_data,
            old_data: event.old_data,
            organization_id: event.organization_id,
        }
    }
}
