//! Execution log — append-only record of one rule invocation.

use serde::{Deserialize, Serialize};

use crate::action::{ActionInstance, ActionKind};
use crate::id::{LogId, RuleId};
use crate::time::Timestamp;
use crate::trigger::TriggerKind;

/// Outcome of one attempted action within an invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// The action kind that was attempted.
    pub action: ActionKind,
    pub success: bool,
    /// Handler-specific result payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure message on error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    /// A successful attempt with the handler's result payload.
    #[must_use]
    pub fn ok(action: ActionKind, result: serde_json::Value) -> Self {
        Self {
            action,
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// A failed attempt carrying the error message.
    #[must_use]
    pub fn failed(action: ActionKind, error: impl Into<String>) -> Self {
        Self {
            action,
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// One record per rule invocation that reached condition evaluation.
///
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: LogId,
    pub rule_id: RuleId,
    /// The trigger that fired the invocation.
    pub trigger_event: TriggerKind,
    /// Snapshot of the full execution context.
    pub context: serde_json::Value,
    pub conditions_met: bool,
    /// The action list that was attempted (empty on the failure path).
    pub actions_executed: Vec<ActionInstance>,
    /// Per-action outcomes, one entry per attempted action.
    pub results: Vec<ActionResult>,
    /// Top-level failure message when the invocation itself failed.
    pub error: Option<String>,
    pub executed_at: Timestamp,
}

impl ExecutionLog {
    /// Record a completed invocation whose conditions were met.
    #[must_use]
    pub fn completed(
        rule_id: RuleId,
        trigger: TriggerKind,
        context: serde_json::Value,
        actions: Vec<ActionInstance>,
        results: Vec<ActionResult>,
    ) -> Self {
        Self {
            id: LogId::new(),
            rule_id,
            trigger_event: trigger,
            context,
            conditions_met: true,
            actions_executed: actions,
            results,
            error: None,
            executed_at: crate::time::now(),
        }
    }

    /// Record an invocation that failed before or after its actions.
    #[must_use]
    pub fn failed(
        rule_id: RuleId,
        trigger: TriggerKind,
        context: serde_json::Value,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: LogId::new(),
            rule_id,
            trigger_event: trigger,
            context,
            conditions_met: false,
            actions_executed: Vec::new(),
            results: Vec::new(),
            error: Some(error.into()),
            executed_at: crate::time::now(),
        }
    }
}
