//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod catalog;
#[allow(clippy::missing_errors_doc)]
pub mod changes;
#[allow(clippy::missing_errors_doc)]
pub mod rules;

use axum::Router;
use axum::routing::{get, post};

use rulehub_app::ports::{LogStore, RuleExecutor, RuleRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<RR, LS, EX>() -> Router<AppState<RR, LS, EX>>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    Router::new()
        // Catalogs
        .route("/triggers", get(catalog::triggers::<RR, LS, EX>))
        .route("/actions", get(catalog::actions::<RR, LS, EX>))
        // Rules
        .route("/rules", post(rules::create::<RR, LS, EX>))
        .route(
            "/rules/{id}",
            get(rules::get::<RR, LS, EX>)
                .put(rules::update::<RR, LS, EX>)
                .delete(rules::delete::<RR, LS, EX>),
        )
        .route("/rules/{id}/active", post(rules::set_active::<RR, LS, EX>))
        .route("/rules/{id}/logs", get(rules::logs::<RR, LS, EX>))
        .route("/rules/{id}/test", post(rules::test_run::<RR, LS, EX>))
        .route(
            "/organizations/{org_id}/rules",
            get(rules::list::<RR, LS, EX>),
        )
        // Change-feed ingest
        .route("/changes", post(changes::ingest::<RR, LS, EX>))
}
