//! JSON REST handlers for the trigger/action catalogs.

use axum::Json;
use axum::extract::State;

use rulehub_app::ports::{LogStore, RuleExecutor, RuleRepository};
use rulehub_domain::action::ActionDefinition;
use rulehub_domain::trigger::TriggerDefinition;

use crate::state::AppState;

/// `GET /api/triggers` — list registered trigger definitions.
pub async fn triggers<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
) -> Json<Vec<TriggerDefinition>>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    Json(state.triggers.list().to_vec())
}

/// `GET /api/actions` — list registered action definitions.
pub async fn actions<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
) -> Json<Vec<ActionDefinition>>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    Json(state.actions.list().to_vec())
}
