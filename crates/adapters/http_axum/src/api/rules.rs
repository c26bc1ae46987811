//! JSON REST handlers for automation rules.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use rulehub_app::engine::ExecutionOutcome;
use rulehub_app::ports::{LogStore, RuleExecutor, RuleRepository};
use rulehub_domain::action::ActionInstance;
use rulehub_domain::condition::Condition;
use rulehub_domain::error::{RuleHubError, ValidationError};
use rulehub_domain::event::ExecutionContext;
use rulehub_domain::id::{OrganizationId, RuleId};
use rulehub_domain::log::ExecutionLog;
use rulehub_domain::rule::AutomationRule;
use rulehub_domain::trigger::TriggerKind;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LOG_LIMIT: usize = 50;

/// Request body for creating a rule.
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub organization_id: OrganizationId,
    pub name: String,
    pub description: Option<String>,
    pub trigger: TriggerKind,
    pub conditions: Option<Vec<Condition>>,
    pub actions: Vec<ActionInstance>,
    pub is_active: Option<bool>,
}

/// Request body for updating a rule.
#[derive(Deserialize)]
pub struct UpdateRuleRequest {
    pub name: String,
    pub description: Option<String>,
    pub trigger: TriggerKind,
    pub conditions: Vec<Condition>,
    pub actions: Vec<ActionInstance>,
    pub is_active: bool,
}

/// Request body for toggling a rule.
#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Query parameters for the log listing endpoint.
#[derive(Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

/// Request body for a test run — the sample context's row images.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRuleRequest {
    pub new_data: serde_json::Value,
    #[serde(default)]
    pub old_data: Option<serde_json::Value>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationRule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get/update endpoints.
pub enum GetResponse {
    Ok(Json<AutomationRule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete/toggle endpoints.
pub enum NoContentResponse {
    NoContent,
}

impl IntoResponse for NoContentResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_rule_id(raw: &str) -> Result<RuleId, ApiError> {
    RuleId::from_str(raw).map_err(|_| {
        ApiError::from(RuleHubError::Validation(ValidationError::MalformedId(
            raw.to_string(),
        )))
    })
}

/// `GET /api/organizations/{org_id}/rules` — list an organization's rules.
pub async fn list<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Path(org_id): Path<String>,
) -> Result<ListResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let organization_id = OrganizationId::from_str(&org_id).map_err(|_| {
        ApiError::from(RuleHubError::Validation(ValidationError::MalformedId(
            org_id.clone(),
        )))
    })?;
    let rules = state.rule_service.list_rules(organization_id).await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/rules/{id}` — get a rule by ID.
pub async fn get<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rule_service.get_rule(rule_id).await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `POST /api/rules` — create a new rule.
pub async fn create<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let mut builder = AutomationRule::builder()
        .organization_id(req.organization_id)
        .name(req.name)
        .trigger(req.trigger);

    if let Some(description) = req.description {
        builder = builder.description(description);
    }
    if let Some(is_active) = req.is_active {
        builder = builder.is_active(is_active);
    }
    for condition in req.conditions.unwrap_or_default() {
        builder = builder.condition(condition);
    }
    for action in req.actions {
        builder = builder.action(action);
    }

    let rule = builder.build()?;
    let created = state.rule_service.create_rule(rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/rules/{id}` — update an existing rule.
///
/// Execution metadata (counters, timestamps) is preserved from the stored
/// rule; only the authoring fields are replaced.
pub async fn update<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;

    let mut rule = state.rule_service.get_rule(rule_id).await?;
    rule.name = req.name;
    rule.description = req.description.unwrap_or_default();
    rule.trigger = req.trigger;
    rule.conditions = req.conditions;
    rule.actions = req.actions;
    rule.is_active = req.is_active;

    let updated = state.rule_service.update_rule(rule).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `POST /api/rules/{id}/active` — enable or disable a rule.
pub async fn set_active<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> Result<NoContentResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    state.rule_service.set_active(rule_id, req.is_active).await?;
    Ok(NoContentResponse::NoContent)
}

/// `DELETE /api/rules/{id}` — delete a rule.
pub async fn delete<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Path(id): Path<String>,
) -> Result<NoContentResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    state.rule_service.delete_rule(rule_id).await?;
    Ok(NoContentResponse::NoContent)
}

/// `GET /api/rules/{id}/logs` — recent execution logs, newest first.
pub async fn logs<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<ExecutionLog>>, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let logs = state.rule_service.get_rule_logs(rule_id, limit).await?;
    Ok(Json(logs))
}

/// `POST /api/rules/{id}/test` — run a rule against a sample context.
///
/// Exercises the same executor path as live dispatch; the rule does not
/// need to be active.
pub async fn test_run<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Path(id): Path<String>,
    Json(req): Json<TestRuleRequest>,
) -> Result<Json<ExecutionOutcome>, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rule_service.get_rule(rule_id).await?;

    let context = ExecutionContext {
        trigger: rule.trigger,
        new_data: req.new_data,
        old_data: req.old_data,
        organization_id: rule.organization_id,
    };
    let outcome = state.executor.execute_test(rule_id, context).await?;
    Ok(Json(outcome))
}
