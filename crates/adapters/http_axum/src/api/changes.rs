//! Change-feed ingest endpoint — the narrow interface through which the
//! external change-data-capture source reaches the dispatcher.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use rulehub_app::ports::{LogStore, RuleExecutor, RuleRepository};
use rulehub_domain::event::ChangeEvent;

use crate::state::AppState;

/// Possible responses from the ingest endpoint.
pub enum IngestResponse {
    /// The change was queued for dispatch.
    Accepted,
    /// The dispatcher is gone; the feed channel is closed.
    Unavailable,
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

/// `POST /api/changes` — enqueue one raw change event.
pub async fn ingest<RR, LS, EX>(
    State(state): State<AppState<RR, LS, EX>>,
    Json(change): Json<ChangeEvent>,
) -> IngestResponse
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    EX: RuleExecutor + Send + Sync + 'static,
{
    match state.feed.send(change).await {
        Ok(()) => IngestResponse::Accepted,
        Err(err) => {
            tracing::error!(error = %err, "change feed channel closed");
            IngestResponse::Unavailable
        }
    }
}
