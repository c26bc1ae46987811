//! Rule engine — matches trigger events to rules, evaluates conditions, and
//! executes actions.
//!
//! The engine is an explicitly constructed object holding its own registries
//! and injected store/channel dependencies. Error recovery happens at the
//! smallest possible scope: a failing action is recorded in its own result, a
//! failing rule invocation is recorded on the rule, and nothing propagates
//! past a single invocation — one bad rule can never stop the dispatch loop.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use rulehub_domain::action::{
    ActionInstance, ActionKind, ConditionalConfig, DelayConfig, EmailConfig, NotificationConfig,
    SmsConfig, TaskConfig, UpdateRecordConfig, WebhookConfig,
};
use rulehub_domain::error::{NotFoundError, RuleHubError};
use rulehub_domain::event::{ExecutionContext, TriggerEvent};
use rulehub_domain::id::RuleId;
use rulehub_domain::interpolate::{interpolate, interpolate_value};
use rulehub_domain::log::{ActionResult, ExecutionLog};
use rulehub_domain::rule::AutomationRule;

use crate::ports::{
    EmailSender, HttpClient, LogStore, PushNotifier, RecordStore, RuleExecutor, RuleRepository,
    SmsSender, TemplateStore,
};
use crate::registry::{ActionRegistry, TriggerRegistry};

/// Terminal state of one rule invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Conditions were not met; no actions ran and no counters moved.
    SkippedConditions,
    /// Conditions were met and every configured action was attempted.
    Completed { results: Vec<ActionResult> },
    /// The invocation itself failed — distinct from an individual action
    /// failing, which is captured inside `Completed`.
    Failed { error: String },
}

/// Failure of a single action attempt.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The action type is not in the registry.
    #[error("unknown action type")]
    UnknownType,

    /// The config did not match the handler's schema.
    #[error("invalid {action} config: {source}")]
    Config {
        action: ActionKind,
        source: serde_json::Error,
    },

    /// The config parsed but a field value is unusable.
    #[error("invalid {action} config: {reason}")]
    Invalid {
        action: ActionKind,
        reason: &'static str,
    },

    /// A referenced message template does not exist.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The webhook endpoint answered outside the 2xx range.
    #[error("webhook returned status {0}")]
    WebhookStatus(u16),

    /// A store or channel dependency failed.
    #[error(transparent)]
    Dependency(#[from] RuleHubError),
}

/// The automation rule engine.
///
/// Generic over its ports so tests can inject in-memory doubles and a
/// process can host multiple isolated instances.
pub struct RuleEngine<RR, LS, TS, RS, ES, SS, PN, HC> {
    triggers: TriggerRegistry,
    actions: ActionRegistry,
    rules: RR,
    logs: LS,
    templates: TS,
    records: RS,
    email: ES,
    sms: SS,
    push: PN,
    http: HC,
}

impl<RR, LS, TS, RS, ES, SS, PN, HC> RuleEngine<RR, LS, TS, RS, ES, SS, PN, HC>
where
    RR: RuleRepository + Send + Sync,
    LS: LogStore + Send + Sync,
    TS: TemplateStore + Send + Sync,
    RS: RecordStore + Send + Sync,
    ES: EmailSender + Send + Sync,
    SS: SmsSender + Send + Sync,
    PN: PushNotifier + Send + Sync,
    HC: HttpClient + Send + Sync,
{
    /// Create a new engine from registries and port implementations.
    #[expect(clippy::too_many_arguments, reason = "composition root wiring")]
    pub fn new(
        triggers: TriggerRegistry,
        actions: ActionRegistry,
        rules: RR,
        logs: LS,
        templates: TS,
        records: RS,
        email: ES,
        sms: SS,
        push: PN,
        http: HC,
    ) -> Self {
        Self {
            triggers,
            actions,
            rules,
            logs,
            templates,
            records,
            email,
            sms,
            push,
            http,
        }
    }

    /// Process one normalized trigger event against the organization's rules.
    ///
    /// Storage failures while matching are logged and treated as "no rules" —
    /// the event counts as handled either way, so a flaky store cannot cause
    /// redelivery storms. Rules referencing unregistered action types are
    /// skipped as configuration errors.
    #[tracing::instrument(
        skip(self, event),
        fields(trigger = %event.trigger, organization = %event.organization_id)
    )]
    pub async fn handle_event(&self, event: TriggerEvent) -> Vec<(RuleId, ExecutionOutcome)> {
        if self.triggers.get(event.trigger).is_none() {
            warn!(trigger = %event.trigger, "unregistered trigger, event dropped");
            return Vec::new();
        }

        let rules = match self
            .rules
            .list_active(event.organization_id, event.trigger)
            .await
        {
            Ok(rules) => rules,
            Err(err) => {
                warn!(error = %err, "failed to load rules, treating event as handled");
                return Vec::new();
            }
        };

        let context = ExecutionContext::from(event);
        let mut outcomes = Vec::with_capacity(rules.len());
        for rule in rules {
            if let Some(action) = rule
                .actions
                .iter()
                .find(|action| self.actions.get(action.kind).is_none())
            {
                warn!(
                    rule = %rule.id,
                    action = %action.kind,
                    "rule references an unregistered action type, skipped"
                );
                continue;
            }
            let outcome = self.execute_rule(&rule, &context).await;
            outcomes.push((rule.id, outcome));
        }
        outcomes
    }

    /// Run one rule invocation: evaluate conditions, execute actions in
    /// order, and persist counters and the execution log.
    pub async fn execute_rule(
        &self,
        rule: &AutomationRule,
        context: &ExecutionContext,
    ) -> ExecutionOutcome {
        let context_value = context.as_value();

        if !self.conditions_met(rule, &context_value) {
            debug!(rule = %rule.id, "conditions not met");
            return ExecutionOutcome::SkippedConditions;
        }

        let results = self.run_actions(&rule.actions, context, &context_value).await;

        match self.record_completion(rule, &context_value, &results).await {
            Ok(()) => ExecutionOutcome::Completed { results },
            Err(err) => {
                let message = err.to_string();
                warn!(rule = %rule.id, error = %err, "rule invocation failed");
                self.record_failure(rule, &context_value, &message).await;
                ExecutionOutcome::Failed { error: message }
            }
        }
    }

    /// Logical AND over the rule's conditions; an empty list is vacuously
    /// true. Unrecognized operators evaluate to false (fail closed) and are
    /// surfaced as configuration warnings.
    fn conditions_met(&self, rule: &AutomationRule, context_value: &Value) -> bool {
        rule.conditions.iter().all(|condition| {
            if condition.operator.is_unknown() {
                warn!(rule = %rule.id, field = %condition.field, "unrecognized operator");
            }
            condition.is_met(context_value)
        })
    }

    /// Execute actions strictly in list order. Every action is attempted
    /// exactly once; a failure is captured in that action's result and never
    /// aborts its siblings.
    async fn run_actions(
        &self,
        actions: &[ActionInstance],
        context: &ExecutionContext,
        context_value: &Value,
    ) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.attempt_action(action, context, context_value).await);
        }
        results
    }

    async fn attempt_action(
        &self,
        action: &ActionInstance,
        context: &ExecutionContext,
        context_value: &Value,
    ) -> ActionResult {
        match self.execute_action(action, context, context_value).await {
            Ok(result) => ActionResult::ok(action.kind, result),
            Err(err) => {
                warn!(action = %action.kind, error = %err, "action failed");
                ActionResult::failed(action.kind, err.to_string())
            }
        }
    }

    /// Dispatch one action to its typed handler.
    async fn execute_action(
        &self,
        action: &ActionInstance,
        context: &ExecutionContext,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        match action.kind {
            ActionKind::SendEmail => self.send_email(action, context_value).await,
            ActionKind::SendSms => self.send_sms(action, context_value).await,
            ActionKind::CreateTask => self.create_task(action, context, context_value).await,
            ActionKind::UpdateRecord => self.update_record(action, context_value).await,
            ActionKind::TriggerWebhook => self.trigger_webhook(action, context_value).await,
            ActionKind::SendNotification => self.send_notification(action, context_value).await,
            ActionKind::Delay => self.delay(action).await,
            ActionKind::Conditional => self.conditional(action, context, context_value).await,
            ActionKind::Unknown => Err(ActionError::UnknownType),
        }
    }

    async fn send_email(
        &self,
        action: &ActionInstance,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        let config: EmailConfig = parse_config(action)?;
        let (subject, body) = match config.template.as_deref() {
            Some(template_id) => {
                let template = self
                    .templates
                    .get(template_id)
                    .await?
                    .ok_or_else(|| ActionError::TemplateNotFound(template_id.to_string()))?;
                let subject = template.subject.as_deref().unwrap_or(&config.subject);
                (
                    interpolate(subject, context_value),
                    interpolate(&template.body, context_value),
                )
            }
            None => (
                interpolate(&config.subject, context_value),
                interpolate(&config.body, context_value),
            ),
        };
        let message_id = self.email.send(&config.to, &subject, &body).await?;
        Ok(json!({ "messageId": message_id }))
    }

    async fn send_sms(
        &self,
        action: &ActionInstance,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        let config: SmsConfig = parse_config(action)?;
        let message = match config.template.as_deref() {
            Some(template_id) => {
                let template = self
                    .templates
                    .get(template_id)
                    .await?
                    .ok_or_else(|| ActionError::TemplateNotFound(template_id.to_string()))?;
                interpolate(&template.body, context_value)
            }
            None => interpolate(&config.message, context_value),
        };
        let message_id = self.sms.send(&config.phone_number, &message).await?;
        Ok(json!({ "messageId": message_id }))
    }

    async fn create_task(
        &self,
        action: &ActionInstance,
        context: &ExecutionContext,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        let config: TaskConfig = parse_config(action)?;
        let mut fields = serde_json::Map::new();
        fields.insert(
            "organization_id".to_string(),
            json!(context.organization_id),
        );
        fields.insert(
            "title".to_string(),
            json!(interpolate(&config.title, context_value)),
        );
        fields.insert(
            "description".to_string(),
            json!(
                config
                    .description
                    .map(|text| interpolate(&text, context_value))
                    .unwrap_or_default()
            ),
        );
        if let Some(assigned_to) = config.assigned_to {
            fields.insert("assigned_to".to_string(), json!(assigned_to));
        }
        if let Some(due_date) = config.due_date {
            fields.insert("due_date".to_string(), json!(due_date));
        }
        fields.insert(
            "priority".to_string(),
            json!(config.priority.as_deref().unwrap_or("medium")),
        );
        fields.insert("status".to_string(), json!("pending"));

        let task_id = self.records.insert("tasks", fields).await?;
        Ok(json!({ "taskId": task_id }))
    }

    async fn update_record(
        &self,
        action: &ActionInstance,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        let config: UpdateRecordConfig = parse_config(action)?;
        if config.table.trim().is_empty() {
            return Err(ActionError::Invalid {
                action: action.kind,
                reason: "table must not be empty",
            });
        }
        if config.record_id.trim().is_empty() {
            return Err(ActionError::Invalid {
                action: action.kind,
                reason: "recordId must not be empty",
            });
        }
        let updates = interpolate_value(&config.updates, context_value);
        let Some(fields) = updates.as_object() else {
            return Err(ActionError::Invalid {
                action: action.kind,
                reason: "updates must be an object",
            });
        };
        self.records
            .update(&config.table, &config.record_id, fields.clone())
            .await?;
        Ok(json!({ "table": config.table, "recordId": config.record_id }))
    }

    async fn trigger_webhook(
        &self,
        action: &ActionInstance,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        let config: WebhookConfig = parse_config(action)?;
        let data = config
            .data
            .map_or_else(|| json!({}), |data| interpolate_value(&data, context_value));
        let method = config.method.as_deref().unwrap_or("POST");
        let response = self
            .http
            .request(&config.url, method, config.headers.as_ref(), Some(&data))
            .await?;
        if !response.is_success() {
            return Err(ActionError::WebhookStatus(response.status));
        }
        Ok(json!({ "status": response.status }))
    }

    async fn send_notification(
        &self,
        action: &ActionInstance,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        let config: NotificationConfig = parse_config(action)?;
        let title = interpolate(&config.title, context_value);
        let body = interpolate(&config.body, context_value);
        let notification_id = self
            .push
            .send(&config.user_id, &title, &body, config.data.as_ref())
            .await?;
        Ok(json!({ "notificationId": notification_id }))
    }

    /// Suspend this rule's action sequence on the runtime timer.
    ///
    /// The task yields back to the scheduler for the whole wait; no worker
    /// thread is held, so many concurrently delayed invocations coexist.
    async fn delay(&self, action: &ActionInstance) -> Result<Value, ActionError> {
        let config: DelayConfig = parse_config(action)?;
        let duration = config.as_duration();
        tokio::time::sleep(duration).await;
        Ok(json!({ "delayedSeconds": duration.as_secs() }))
    }

    /// Evaluate the embedded condition and run one of the two sublists,
    /// aggregating the sub-results as this action's own result.
    async fn conditional(
        &self,
        action: &ActionInstance,
        context: &ExecutionContext,
        context_value: &Value,
    ) -> Result<Value, ActionError> {
        let config: ConditionalConfig = parse_config(action)?;
        let condition_met = config.condition.is_met(context_value);
        let branch = if condition_met {
            &config.true_actions
        } else {
            &config.false_actions
        };

        let mut results = Vec::with_capacity(branch.len());
        for nested in branch {
            // Boxed to break the async recursion cycle through execute_action.
            let attempt = Box::pin(self.execute_action(nested, context, context_value)).await;
            results.push(match attempt {
                Ok(result) => ActionResult::ok(nested.kind, result),
                Err(err) => ActionResult::failed(nested.kind, err.to_string()),
            });
        }

        Ok(json!({ "conditionMet": condition_met, "results": results }))
    }

    async fn record_completion(
        &self,
        rule: &AutomationRule,
        context_value: &Value,
        results: &[ActionResult],
    ) -> Result<(), RuleHubError> {
        self.rules
            .increment_execution(rule.id, rulehub_domain::time::now())
            .await?;
        self.logs
            .append(ExecutionLog::completed(
                rule.id,
                rule.trigger,
                context_value.clone(),
                rule.actions.clone(),
                results.to_vec(),
            ))
            .await?;
        Ok(())
    }

    /// Best-effort error bookkeeping; its own failures are logged and
    /// swallowed so nothing escapes the invocation.
    async fn record_failure(&self, rule: &AutomationRule, context_value: &Value, message: &str) {
        if let Err(err) = self.rules.increment_error(rule.id, message).await {
            tracing::error!(rule = %rule.id, error = %err, "failed to record rule error");
        }
        if let Err(err) = self
            .logs
            .append(ExecutionLog::failed(
                rule.id,
                rule.trigger,
                context_value.clone(),
                message,
            ))
            .await
        {
            tracing::error!(rule = %rule.id, error = %err, "failed to append failure log");
        }
    }
}

impl<RR, LS, TS, RS, ES, SS, PN, HC> RuleExecutor for RuleEngine<RR, LS, TS, RS, ES, SS, PN, HC>
where
    RR: RuleRepository + Send + Sync,
    LS: LogStore + Send + Sync,
    TS: TemplateStore + Send + Sync,
    RS: RecordStore + Send + Sync,
    ES: EmailSender + Send + Sync,
    SS: SmsSender + Send + Sync,
    PN: PushNotifier + Send + Sync,
    HC: HttpClient + Send + Sync,
{
    async fn execute_test(
        &self,
        rule_id: RuleId,
        context: ExecutionContext,
    ) -> Result<ExecutionOutcome, RuleHubError> {
        let rule = self.rules.get_by_id(rule_id).await?.ok_or_else(|| {
            RuleHubError::from(NotFoundError {
                entity: "Rule",
                id: rule_id.to_string(),
            })
        })?;
        Ok(self.execute_rule(&rule, &context).await)
    }
}

fn parse_config<T: serde::de::DeserializeOwned>(action: &ActionInstance) -> Result<T, ActionError> {
    serde_json::from_value(action.config.clone()).map_err(|source| ActionError::Config {
        action: action.kind,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{HttpResponse, MessageTemplate};
    use rulehub_domain::condition::{Condition, Operator};
    use rulehub_domain::id::OrganizationId;
    use rulehub_domain::trigger::TriggerKind;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ── In-memory rule repo ────────────────────────────────────────

    #[derive(Default)]
    struct InMemoryRuleRepo {
        store: Mutex<HashMap<RuleId, AutomationRule>>,
        fail_list: bool,
        fail_execution_increment: bool,
    }

    impl InMemoryRuleRepo {
        fn with(rules: Vec<AutomationRule>) -> Self {
            let map: HashMap<_, _> = rules.into_iter().map(|r| (r.id, r)).collect();
            Self {
                store: Mutex::new(map),
                ..Self::default()
            }
        }

        fn snapshot(&self, id: RuleId) -> AutomationRule {
            self.store.lock().unwrap().get(&id).cloned().unwrap()
        }
    }

    fn storage_error(message: &'static str) -> RuleHubError {
        RuleHubError::Storage(Box::new(std::io::Error::other(message)))
    }

    impl RuleRepository for InMemoryRuleRepo {
        async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, RuleHubError> {
            self.store.lock().unwrap().insert(rule.id, rule.clone());
            Ok(rule)
        }

        async fn get_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, RuleHubError> {
            Ok(self.store.lock().unwrap().get(&id).cloned())
        }

        async fn get_by_organization(
            &self,
            organization_id: OrganizationId,
        ) -> Result<Vec<AutomationRule>, RuleHubError> {
            Ok(self
                .store
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.organization_id == organization_id)
                .cloned()
                .collect())
        }

        async fn list_active(
            &self,
            organization_id: OrganizationId,
            trigger: TriggerKind,
        ) -> Result<Vec<AutomationRule>, RuleHubError> {
            if self.fail_list {
                return Err(storage_error("store unreachable"));
            }
            Ok(self
                .store
                .lock()
                .unwrap()
                .values()
                .filter(|r| {
                    r.is_active && r.organization_id == organization_id && r.trigger == trigger
                })
                .cloned()
                .collect())
        }

        async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, RuleHubError> {
            self.store.lock().unwrap().insert(rule.id, rule.clone());
            Ok(rule)
        }

        async fn delete(&self, id: RuleId) -> Result<(), RuleHubError> {
            self.store.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn set_active(&self, id: RuleId, is_active: bool) -> Result<(), RuleHubError> {
            let mut store = self.store.lock().unwrap();
            let rule = store.get_mut(&id).ok_or(NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            })?;
            rule.is_active = is_active;
            Ok(())
        }

        async fn increment_execution(
            &self,
            id: RuleId,
            at: rulehub_domain::time::Timestamp,
        ) -> Result<(), RuleHubError> {
            if self.fail_execution_increment {
                return Err(storage_error("increment failed"));
            }
            let mut store = self.store.lock().unwrap();
            if let Some(rule) = store.get_mut(&id) {
                rule.execution_count += 1;
                rule.last_executed = Some(at);
            }
            Ok(())
        }

        async fn increment_error(&self, id: RuleId, message: &str) -> Result<(), RuleHubError> {
            let mut store = self.store.lock().unwrap();
            if let Some(rule) = store.get_mut(&id) {
                rule.error_count += 1;
                rule.last_error = Some(message.to_string());
            }
            Ok(())
        }
    }

    // ── In-memory log store ────────────────────────────────────────

    #[derive(Default)]
    struct InMemoryLogStore {
        logs: Mutex<Vec<ExecutionLog>>,
    }

    impl LogStore for InMemoryLogStore {
        async fn append(&self, log: ExecutionLog) -> Result<ExecutionLog, RuleHubError> {
            self.logs.lock().unwrap().push(log.clone());
            Ok(log)
        }

        async fn find_by_rule(
            &self,
            rule_id: RuleId,
            limit: usize,
        ) -> Result<Vec<ExecutionLog>, RuleHubError> {
            Ok(self
                .logs
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|log| log.rule_id == rule_id)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    // ── Template store ─────────────────────────────────────────────

    #[derive(Default)]
    struct StaticTemplates {
        templates: HashMap<String, MessageTemplate>,
    }

    impl StaticTemplates {
        fn with(template: MessageTemplate) -> Self {
            let mut templates = HashMap::new();
            templates.insert(template.id.clone(), template);
            Self { templates }
        }
    }

    impl TemplateStore for StaticTemplates {
        async fn get(&self, id: &str) -> Result<Option<MessageTemplate>, RuleHubError> {
            Ok(self.templates.get(id).cloned())
        }
    }

    // ── Record store ───────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingRecords {
        inserts: Mutex<Vec<(String, serde_json::Map<String, Value>)>>,
        updates: Mutex<Vec<(String, String, serde_json::Map<String, Value>)>>,
    }

    impl RecordStore for RecordingRecords {
        async fn insert(
            &self,
            table: &str,
            fields: serde_json::Map<String, Value>,
        ) -> Result<String, RuleHubError> {
            self.inserts.lock().unwrap().push((table.to_string(), fields));
            Ok(format!("rec-{}", self.inserts.lock().unwrap().len()))
        }

        async fn update(
            &self,
            table: &str,
            record_id: &str,
            fields: serde_json::Map<String, Value>,
        ) -> Result<(), RuleHubError> {
            self.updates.lock().unwrap().push((
                table.to_string(),
                record_id.to_string(),
                fields,
            ));
            Ok(())
        }
    }

    // ── Channel spies ──────────────────────────────────────────────

    #[derive(Default)]
    struct SpyEmail {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl EmailSender for SpyEmail {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, RuleHubError> {
            if self.fail {
                return Err(RuleHubError::Channel(Box::new(std::io::Error::other(
                    "mail gateway down",
                ))));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(format!("email-{}", sent.len()))
        }
    }

    #[derive(Default)]
    struct SpySms {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl SmsSender for SpySms {
        async fn send(&self, phone: &str, message: &str) -> Result<String, RuleHubError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((phone.to_string(), message.to_string()));
            Ok(format!("sms-{}", sent.len()))
        }
    }

    #[derive(Default)]
    struct SpyPush {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl PushNotifier for SpyPush {
        async fn send(
            &self,
            user_id: &str,
            title: &str,
            body: &str,
            _data: Option<&Value>,
        ) -> Result<String, RuleHubError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((user_id.to_string(), title.to_string(), body.to_string()));
            Ok(format!("push-{}", sent.len()))
        }
    }

    struct StubHttp {
        status: u16,
        calls: Mutex<Vec<(String, String, Value)>>,
    }

    impl StubHttp {
        fn responding(status: u16) -> Self {
            Self {
                status,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for StubHttp {
        async fn request(
            &self,
            url: &str,
            method: &str,
            _headers: Option<&serde_json::Map<String, Value>>,
            body: Option<&Value>,
        ) -> Result<HttpResponse, RuleHubError> {
            self.calls.lock().unwrap().push((
                url.to_string(),
                method.to_string(),
                body.cloned().unwrap_or(Value::Null),
            ));
            Ok(HttpResponse { status: self.status })
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    type TestEngine = RuleEngine<
        InMemoryRuleRepo,
        InMemoryLogStore,
        StaticTemplates,
        RecordingRecords,
        SpyEmail,
        SpySms,
        SpyPush,
        StubHttp,
    >;

    struct TestBed {
        repo: InMemoryRuleRepo,
        email: SpyEmail,
        http: StubHttp,
        templates: StaticTemplates,
    }

    impl Default for TestBed {
        fn default() -> Self {
            Self {
                repo: InMemoryRuleRepo::default(),
                email: SpyEmail::default(),
                http: StubHttp::responding(200),
                templates: StaticTemplates::default(),
            }
        }
    }

    impl TestBed {
        fn with_rules(rules: Vec<AutomationRule>) -> Self {
            Self {
                repo: InMemoryRuleRepo::with(rules),
                ..Self::default()
            }
        }

        fn build(self) -> TestEngine {
            RuleEngine::new(
                TriggerRegistry::builtin(),
                ActionRegistry::builtin(),
                self.repo,
                InMemoryLogStore::default(),
                self.templates,
                RecordingRecords::default(),
                self.email,
                SpySms::default(),
                SpyPush::default(),
                self.http,
            )
        }
    }

    fn make_engine(rules: Vec<AutomationRule>) -> TestEngine {
        TestBed::with_rules(rules).build()
    }

    fn email_action() -> ActionInstance {
        ActionInstance {
            kind: ActionKind::SendEmail,
            config: json!({
                "to": "ops@example.com",
                "subject": "Lost: {{newData.id}}",
                "body": "Bottle {{newData.id}} reported lost"
            }),
        }
    }

    fn lost_bottle_rule(organization_id: OrganizationId) -> AutomationRule {
        AutomationRule::builder()
            .organization_id(organization_id)
            .name("Lost bottle alert")
            .trigger(TriggerKind::BottleStatusChanged)
            .condition(Condition {
                field: "newData.status".to_string(),
                operator: Operator::Equals,
                value: json!("lost"),
            })
            .action(email_action())
            .build()
            .unwrap()
    }

    fn bottle_event(organization_id: OrganizationId, status: &str) -> TriggerEvent {
        TriggerEvent {
            trigger: TriggerKind::BottleStatusChanged,
            new_data: json!({"id": "B1", "status": status, "organization_id": organization_id}),
            old_data: Some(json!({"status": "active"})),
            organization_id,
        }
    }

    // ── Matching & condition gate ──────────────────────────────────

    #[tokio::test]
    async fn should_execute_rule_and_increment_counter_when_conditions_met() {
        let org = OrganizationId::new();
        let rule = lost_bottle_rule(org);
        let rule_id = rule.id;
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;

        assert_eq!(outcomes.len(), 1);
        let (id, outcome) = &outcomes[0];
        assert_eq!(*id, rule_id);
        let ExecutionOutcome::Completed { results } = outcome else {
            panic!("expected completed outcome, got {outcome:?}");
        };
        assert_eq!(results.len(), 1);
        assert!(results[0].success);

        let sent = engine.email.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Lost: B1");

        let updated = engine.rules.snapshot(rule_id);
        assert_eq!(updated.execution_count, 1);
        assert!(updated.last_executed.is_some());

        let logs = engine.logs.logs.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].conditions_met);
        assert_eq!(logs[0].results.len(), 1);
    }

    #[tokio::test]
    async fn should_skip_actions_and_counters_when_conditions_not_met() {
        let org = OrganizationId::new();
        let rule = lost_bottle_rule(org);
        let rule_id = rule.id;
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "active")).await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].1, ExecutionOutcome::SkippedConditions);
        assert!(engine.email.sent.lock().unwrap().is_empty());
        assert_eq!(engine.rules.snapshot(rule_id).execution_count, 0);
        // Skipped evaluations are not logged.
        assert!(engine.logs.logs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_treat_empty_condition_list_as_met() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Unconditional")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(email_action())
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "anything")).await;
        assert!(matches!(
            outcomes[0].1,
            ExecutionOutcome::Completed { .. }
        ));
    }

    #[tokio::test]
    async fn should_not_match_rules_of_other_organizations() {
        let org = OrganizationId::new();
        let other = OrganizationId::new();
        let engine = make_engine(vec![lost_bottle_rule(other)]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn should_not_match_inactive_rules() {
        let org = OrganizationId::new();
        let mut rule = lost_bottle_rule(org);
        rule.is_active = false;
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn should_treat_event_as_handled_when_rule_listing_fails() {
        let org = OrganizationId::new();
        let mut repo = InMemoryRuleRepo::with(vec![lost_bottle_rule(org)]);
        repo.fail_list = true;
        let engine = TestBed {
            repo,
            ..TestBed::default()
        }
        .build();

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        assert!(outcomes.is_empty());
        assert!(engine.logs.logs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_skip_rule_referencing_unregistered_action_type() {
        let org = OrganizationId::new();
        let mut rule = lost_bottle_rule(org);
        rule.actions.push(ActionInstance {
            kind: ActionKind::Unknown,
            config: json!({}),
        });
        let rule_id = rule.id;
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        assert!(outcomes.is_empty());
        assert!(engine.email.sent.lock().unwrap().is_empty());
        assert_eq!(engine.rules.snapshot(rule_id).execution_count, 0);
    }

    // ── Action sequencing ──────────────────────────────────────────

    #[tokio::test]
    async fn should_attempt_every_action_even_after_a_failure() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Email then webhook")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(email_action())
            .action(ActionInstance {
                kind: ActionKind::TriggerWebhook,
                config: json!({"url": "https://hooks.example.com/lost"}),
            })
            .build()
            .unwrap();
        let rule_id = rule.id;
        let engine = TestBed {
            repo: InMemoryRuleRepo::with(vec![rule]),
            email: SpyEmail {
                fail: true,
                ..SpyEmail::default()
            },
            ..TestBed::default()
        }
        .build();

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };

        // One result per configured action, in order.
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(engine.http.calls.lock().unwrap().len(), 1);
        // Partial failure still counts as an execution.
        assert_eq!(engine.rules.snapshot(rule_id).execution_count, 1);
    }

    #[tokio::test]
    async fn should_record_webhook_status_failure_and_continue() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Webhook then email")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::TriggerWebhook,
                config: json!({"url": "https://hooks.example.com/lost"}),
            })
            .action(email_action())
            .build()
            .unwrap();
        let engine = TestBed {
            repo: InMemoryRuleRepo::with(vec![rule]),
            http: StubHttp::responding(500),
            ..TestBed::default()
        }
        .build();

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };

        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("500"));
        // The next action in the same rule still executed.
        assert!(results[1].success);
        assert_eq!(engine.email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_fail_single_action_when_nested_type_is_unregistered() {
        let org = OrganizationId::new();
        let rule = lost_bottle_rule(org);
        let context = ExecutionContext::from(bottle_event(org, "lost"));
        let engine = make_engine(vec![]);

        // Direct executor path (testRule): an unknown type fails its own
        // attempt without aborting siblings.
        let mut patched = rule;
        patched.actions = vec![
            ActionInstance {
                kind: ActionKind::Unknown,
                config: json!({}),
            },
            email_action(),
        ];
        let outcome = engine.execute_rule(&patched, &context).await;
        let ExecutionOutcome::Completed { results } = outcome else {
            panic!("expected completed outcome");
        };
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("unknown action type"));
        assert!(results[1].success);
    }

    // ── Individual handlers ────────────────────────────────────────

    #[tokio::test]
    async fn should_resolve_template_for_email_when_configured() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Templated email")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::SendEmail,
                config: json!({
                    "to": "ops@example.com",
                    "subject": "ignored",
                    "body": "ignored",
                    "template": "lost_bottle"
                }),
            })
            .build()
            .unwrap();
        let engine = TestBed {
            repo: InMemoryRuleRepo::with(vec![rule]),
            templates: StaticTemplates::with(MessageTemplate {
                id: "lost_bottle".to_string(),
                subject: Some("Bottle {{newData.id}} lost".to_string()),
                body: "Please investigate bottle {{newData.id}}".to_string(),
            }),
            ..TestBed::default()
        }
        .build();

        engine.handle_event(bottle_event(org, "lost")).await;

        let sent = engine.email.sent.lock().unwrap();
        assert_eq!(sent[0].1, "Bottle B1 lost");
        assert_eq!(sent[0].2, "Please investigate bottle B1");
    }

    #[tokio::test]
    async fn should_fail_action_when_template_is_missing() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Missing template")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::SendEmail,
                config: json!({
                    "to": "ops@example.com",
                    "subject": "s",
                    "body": "b",
                    "template": "nope"
                }),
            })
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("template not found"));
        assert!(engine.email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_fail_action_when_required_config_field_is_missing() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Bad config")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::SendEmail,
                config: json!({"to": "ops@example.com"}),
            })
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("send_email config"));
    }

    #[tokio::test]
    async fn should_insert_task_with_interpolated_and_default_fields() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Create follow-up task")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::CreateTask,
                config: json!({
                    "title": "Recover bottle {{newData.id}}",
                    "assignedTo": "user-7"
                }),
            })
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };
        assert!(results[0].success);
        assert!(results[0].result.as_ref().unwrap().get("taskId").is_some());

        let inserts = engine.records.inserts.lock().unwrap();
        let (table, fields) = &inserts[0];
        assert_eq!(table, "tasks");
        assert_eq!(fields["title"], json!("Recover bottle B1"));
        assert_eq!(fields["organization_id"], json!(org));
        assert_eq!(fields["priority"], json!("medium"));
        assert_eq!(fields["status"], json!("pending"));
        assert_eq!(fields["assigned_to"], json!("user-7"));
    }

    #[tokio::test]
    async fn should_update_record_with_interpolated_payload() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Flag bottle")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::UpdateRecord,
                config: json!({
                    "table": "bottles",
                    "recordId": "{{newData.id}}",
                    "updates": {"notes": "lost near {{newData.status}}"}
                }),
            })
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        engine.handle_event(bottle_event(org, "lost")).await;

        let updates = engine.records.updates.lock().unwrap();
        let (table, record_id, fields) = &updates[0];
        assert_eq!(table, "bottles");
        assert_eq!(record_id, "B1");
        assert_eq!(fields["notes"], json!("lost near lost"));
    }

    #[tokio::test]
    async fn should_reject_update_record_with_empty_target() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Bad update")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::UpdateRecord,
                config: json!({"table": "", "recordId": "B1", "updates": {}}),
            })
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("table"));
        assert!(engine.records.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_post_interpolated_webhook_payload_with_default_method() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Webhook")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::TriggerWebhook,
                config: json!({
                    "url": "https://hooks.example.com/bottles",
                    "data": {"bottle": "{{newData.id}}"}
                }),
            })
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        engine.handle_event(bottle_event(org, "lost")).await;

        let calls = engine.http.calls.lock().unwrap();
        let (url, method, body) = &calls[0];
        assert_eq!(url, "https://hooks.example.com/bottles");
        assert_eq!(method, "POST");
        assert_eq!(body, &json!({"bottle": "B1"}));
    }

    #[tokio::test]
    async fn should_send_push_notification_with_interpolated_text() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Notify driver")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::SendNotification,
                config: json!({
                    "userId": "user-3",
                    "title": "Bottle {{newData.id}}",
                    "body": "Status is now {{newData.status}}"
                }),
            })
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        engine.handle_event(bottle_event(org, "lost")).await;

        let sent = engine.push.sent.lock().unwrap();
        assert_eq!(sent[0], (
            "user-3".to_string(),
            "Bottle B1".to_string(),
            "Status is now lost".to_string(),
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn should_suspend_on_delay_without_blocking_and_then_continue() {
        let org = OrganizationId::new();
        let rule = AutomationRule::builder()
            .organization_id(org)
            .name("Delayed email")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::Delay,
                config: json!({"duration": 5, "unit": "minutes"}),
            })
            .action(email_action())
            .build()
            .unwrap();
        let engine = make_engine(vec![rule]);

        // Paused time auto-advances across the timer; the sequence continues
        // after the suspension with the email still sent in order.
        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert_eq!(
            results[0].result.as_ref().unwrap()["delayedSeconds"],
            json!(300)
        );
        assert_eq!(engine.email.sent.lock().unwrap().len(), 1);
    }

    // ── Conditional ────────────────────────────────────────────────

    fn conditional_rule(org: OrganizationId) -> AutomationRule {
        AutomationRule::builder()
            .organization_id(org)
            .name("Branching")
            .trigger(TriggerKind::BottleStatusChanged)
            .action(ActionInstance {
                kind: ActionKind::Conditional,
                config: json!({
                    "condition": {
                        "field": "newData.status",
                        "operator": "equals",
                        "value": "lost"
                    },
                    "trueActions": [{
                        "type": "send_email",
                        "config": {
                            "to": "ops@example.com",
                            "subject": "lost",
                            "body": "lost"
                        }
                    }],
                    "falseActions": [{
                        "type": "send_sms",
                        "config": {"phoneNumber": "+15550100", "message": "fine"}
                    }]
                }),
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_execute_only_true_branch_when_condition_holds() {
        let org = OrganizationId::new();
        let engine = make_engine(vec![conditional_rule(org)]);

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        let ExecutionOutcome::Completed { results } = &outcomes[0].1 else {
            panic!("expected completed outcome");
        };

        assert!(results[0].success);
        let aggregate = results[0].result.as_ref().unwrap();
        assert_eq!(aggregate["conditionMet"], json!(true));
        assert_eq!(aggregate["results"].as_array().unwrap().len(), 1);
        assert_eq!(engine.email.sent.lock().unwrap().len(), 1);
        assert!(engine.sms.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_execute_only_false_branch_when_condition_fails() {
        let org = OrganizationId::new();
        let engine = make_engine(vec![conditional_rule(org)]);

        engine.handle_event(bottle_event(org, "active")).await;

        assert!(engine.email.sent.lock().unwrap().is_empty());
        assert_eq!(engine.sms.sent.lock().unwrap().len(), 1);
    }

    // ── Failure bookkeeping ────────────────────────────────────────

    #[tokio::test]
    async fn should_record_error_and_failure_log_when_counter_update_fails() {
        let org = OrganizationId::new();
        let rule = lost_bottle_rule(org);
        let rule_id = rule.id;
        let mut repo = InMemoryRuleRepo::with(vec![rule]);
        repo.fail_execution_increment = true;
        let engine = TestBed {
            repo,
            ..TestBed::default()
        }
        .build();

        let outcomes = engine.handle_event(bottle_event(org, "lost")).await;
        assert!(matches!(outcomes[0].1, ExecutionOutcome::Failed { .. }));

        let updated = engine.rules.snapshot(rule_id);
        assert_eq!(updated.error_count, 1);
        assert!(updated.last_error.is_some());

        let logs = engine.logs.logs.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].conditions_met);
        assert!(logs[0].actions_executed.is_empty());
        assert!(logs[0].error.is_some());
    }

    // ── Test execution port ────────────────────────────────────────

    #[tokio::test]
    async fn should_run_inactive_rule_through_test_port() {
        let org = OrganizationId::new();
        let mut rule = lost_bottle_rule(org);
        rule.is_active = false;
        let rule_id = rule.id;
        let engine = make_engine(vec![rule]);

        let context = ExecutionContext::from(bottle_event(org, "lost"));
        let outcome = engine.execute_test(rule_id, context).await.unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Completed { .. }));
        assert_eq!(engine.email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_when_testing_missing_rule() {
        let org = OrganizationId::new();
        let engine = make_engine(vec![]);
        let context = ExecutionContext::from(bottle_event(org, "lost"));

        let result = engine.execute_test(RuleId::new(), context).await;
        assert!(matches!(result, Err(RuleHubError::NotFound(_))));
    }
}
