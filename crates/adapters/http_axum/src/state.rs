//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::mpsc;

use rulehub_app::ports::{LogStore, RuleExecutor, RuleRepository};
use rulehub_app::registry::{ActionRegistry, TriggerRegistry};
use rulehub_app::services::rule_service::RuleService;
use rulehub_domain::event::ChangeEvent;

/// Application state shared across all axum handlers.
///
/// Generic over the repository, log store, and executor types to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<RR, LS, EX> {
    /// Rule authoring service.
    pub rule_service: Arc<RuleService<RR, LS>>,
    /// Engine-backed executor for test runs.
    pub executor: Arc<EX>,
    /// Trigger catalog for UI metadata.
    pub triggers: Arc<TriggerRegistry>,
    /// Action catalog for UI metadata.
    pub actions: Arc<ActionRegistry>,
    /// Producer side of the dispatcher's change feed.
    pub feed: mpsc::Sender<ChangeEvent>,
}

impl<RR, LS, EX> Clone for AppState<RR, LS, EX> {
    fn clone(&self) -> Self {
        Self {
            rule_service: Arc::clone(&self.rule_service),
            executor: Arc::clone(&self.executor),
            triggers: Arc::clone(&self.triggers),
            actions: Arc::clone(&self.actions),
            feed: self.feed.clone(),
        }
    }
}

impl<RR, LS, EX> AppState<RR, LS, EX>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    /// Create a new application state.
    ///
    /// The executor is taken pre-wrapped because the engine behind it is
    /// shared with the dispatcher task.
    pub fn new(
        rule_service: RuleService<RR, LS>,
        executor: Arc<EX>,
        triggers: TriggerRegistry,
        actions: ActionRegistry,
        feed: mpsc::Sender<ChangeEvent>,
    ) -> Self {
        Self {
            rule_service: Arc::new(rule_service),
            executor,
            triggers: Arc::new(triggers),
            actions: Arc::new(actions),
            feed,
        }
    }
}
