//! Event dispatcher — turns raw change-feed items into trigger events and
//! feeds them to the engine.
//!
//! The external change feed is modeled as an mpsc channel of [`ChangeEvent`]s
//! consumed by a single dispatch loop; each normalized event is processed on
//! its own spawned task so pipelines for independent events proceed
//! concurrently. A malformed event is dropped with a warning and never stops
//! the loop.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rulehub_domain::event::{ChangeEvent, ChangeOperation, TriggerEvent};
use rulehub_domain::trigger::TriggerKind;

use crate::engine::RuleEngine;
use crate::ports::{
    EmailSender, HttpClient, LogStore, PushNotifier, RecordStore, RuleRepository, SmsSender,
    TemplateStore,
};

/// Normalize a raw change into its canonical trigger event.
///
/// Returns `None` (dropping the change) when the table/operation pair has no
/// trigger mapping or the new row carries no usable `organization_id`.
#[must_use]
pub fn normalize(change: &ChangeEvent) -> Option<TriggerEvent> {
    let trigger = canonical_trigger(change)?;

    let organization_id = change
        .new
        .get("organization_id")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok());
    let Some(organization_id) = organization_id else {
        warn!(
            table = %change.table,
            trigger = %trigger,
            "change event without organization id dropped"
        );
        return None;
    };

    Some(TriggerEvent {
        trigger,
        new_data: change.new.clone(),
        old_data: change.old.clone(),
        organization_id,
    })
}

/// The fixed (table, operation, status-diff) → trigger mapping.
fn canonical_trigger(change: &ChangeEvent) -> Option<TriggerKind> {
    let trigger = match (change.table.as_str(), change.operation) {
        ("bottles", ChangeOperation::Insert) => TriggerKind::BottleCreated,
        ("bottles", ChangeOperation::Update) => {
            if status_changed(change) {
                TriggerKind::BottleStatusChanged
            } else {
                TriggerKind::BottleUpdated
            }
        }
        ("rentals", ChangeOperation::Insert) => TriggerKind::RentalCreated,
        ("rentals", ChangeOperation::Update) => match changed_status(change) {
            Some("completed") => TriggerKind::RentalCompleted,
            Some("overdue") => TriggerKind::RentalOverdue,
            _ => TriggerKind::RentalUpdated,
        },
        ("deliveries", ChangeOperation::Insert) => TriggerKind::DeliveryScheduled,
        ("deliveries", ChangeOperation::Update) => match changed_status(change) {
            Some("in_transit") => TriggerKind::DeliveryStarted,
            Some("delivered" | "completed") => TriggerKind::DeliveryCompleted,
            _ => {
                debug!(table = %change.table, "delivery update without mapped status, dropped");
                return None;
            }
        },
        ("maintenance_records", ChangeOperation::Insert) => TriggerKind::MaintenanceScheduled,
        ("maintenance_records", ChangeOperation::Update) => match changed_status(change) {
            Some("due") => TriggerKind::MaintenanceDue,
            Some("completed") => TriggerKind::MaintenanceCompleted,
            _ => {
                debug!(table = %change.table, "maintenance update without mapped status, dropped");
                return None;
            }
        },
        ("customers", ChangeOperation::Insert) => TriggerKind::CustomerCreated,
        ("customers", ChangeOperation::Update) => TriggerKind::CustomerUpdated,
        ("invoices", ChangeOperation::Insert) => TriggerKind::InvoiceCreated,
        ("invoices", ChangeOperation::Update) => match changed_status(change) {
            Some("overdue") => TriggerKind::InvoiceOverdue,
            _ => {
                debug!(table = %change.table, "invoice update without mapped status, dropped");
                return None;
            }
        },
        ("payment_records", ChangeOperation::Insert) => TriggerKind::PaymentReceived,
        _ => {
            debug!(
                table = %change.table,
                operation = ?change.operation,
                "no trigger mapping for change, dropped"
            );
            return None;
        }
    };
    Some(trigger)
}

fn row_status(row: &Value) -> Option<&str> {
    row.get("status").and_then(Value::as_str)
}

/// Both row images carry a status and they differ.
fn status_changed(change: &ChangeEvent) -> bool {
    match (
        row_status(&change.new),
        change.old.as_ref().and_then(row_status),
    ) {
        (Some(new), Some(old)) => new != old,
        _ => false,
    }
}

/// The new status, only when it actually changed from the old row.
fn changed_status(change: &ChangeEvent) -> Option<&str> {
    if status_changed(change) {
        row_status(&change.new)
    } else {
        None
    }
}

/// Consumes the change feed and dispatches normalized events to the engine.
pub struct EventDispatcher<RR, LS, TS, RS, ES, SS, PN, HC> {
    engine: Arc<RuleEngine<RR, LS, TS, RS, ES, SS, PN, HC>>,
}

impl<RR, LS, TS, RS, ES, SS, PN, HC> EventDispatcher<RR, LS, TS, RS, ES, SS, PN, HC>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LogStore + Send + Sync + 'static,
    TS: TemplateStore + Send + Sync + 'static,
    RS: RecordStore + Send + Sync + 'static,
    ES: EmailSender + Send + Sync + 'static,
    SS: SmsSender + Send + Sync + 'static,
    PN: PushNotifier + Send + Sync + 'static,
    HC: HttpClient + Send + Sync + 'static,
{
    /// Create a dispatcher bound to an engine.
    pub fn new(engine: Arc<RuleEngine<RR, LS, TS, RS, ES, SS, PN, HC>>) -> Self {
        Self { engine }
    }

    /// Run the dispatch loop until the feed channel closes.
    ///
    /// Each normalized event runs on its own task; rule executions for
    /// different events proceed concurrently while actions within one rule
    /// invocation stay strictly sequential.
    pub async fn run(self, mut feed: mpsc::Receiver<ChangeEvent>) {
        info!("event dispatcher started");
        while let Some(change) = feed.recv().await {
            let Some(event) = normalize(&change) else {
                continue;
            };
            let engine = Arc::clone(&self.engine);
            tokio::spawn(async move {
                engine.handle_event(event).await;
            });
        }
        info!("change feed closed, dispatcher stopping");
    }
}
