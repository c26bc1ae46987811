//! Trigger — a named class of business event a rule can react to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The built-in trigger catalog.
///
/// Each variant names a domain event emitted by the change-feed dispatcher.
/// Rules reference triggers by these snake_case ids in storage and over the
/// API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    BottleCreated,
    BottleUpdated,
    BottleStatusChanged,
    RentalCreated,
    RentalUpdated,
    RentalCompleted,
    RentalOverdue,
    DeliveryScheduled,
    DeliveryStarted,
    DeliveryCompleted,
    MaintenanceDue,
    MaintenanceScheduled,
    MaintenanceCompleted,
    CustomerCreated,
    CustomerUpdated,
    InvoiceCreated,
    InvoiceOverdue,
    PaymentReceived,
}

impl TriggerKind {
    /// The snake_case id used in storage, logs, and the API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottleCreated => "bottle_created",
            Self::BottleUpdated => "bottle_updated",
            Self::BottleStatusChanged => "bottle_status_changed",
            Self::RentalCreated => "rental_created",
            Self::RentalUpdated => "rental_updated",
            Self::RentalCompleted => "rental_completed",
            Self::RentalOverdue => "rental_overdue",
            Self::DeliveryScheduled => "delivery_scheduled",
            Self::DeliveryStarted => "delivery_started",
            Self::DeliveryCompleted => "delivery_completed",
            Self::MaintenanceDue => "maintenance_due",
            Self::MaintenanceScheduled => "maintenance_scheduled",
            Self::MaintenanceCompleted => "maintenance_completed",
            Self::CustomerCreated => "customer_created",
            Self::CustomerUpdated => "customer_updated",
            Self::InvoiceCreated => "invoice_created",
            Self::InvoiceOverdue => "invoice_overdue",
            Self::PaymentReceived => "payment_received",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = UnknownTriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| UnknownTriggerError(s.to_string()))
    }
}

/// Returned when a string does not name a registered trigger.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown trigger: {0}")]
pub struct UnknownTriggerError(pub String);

/// Catalog entry describing a trigger kind for validation and UI generation.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerDefinition {
    /// The trigger this definition describes.
    pub kind: TriggerKind,
    /// Human-readable name, e.g. `"Bottle Status Changed"`.
    pub name: &'static str,
    /// One-line description of when the trigger fires.
    pub description: &'static str,
    /// Field names expected on the event context's `newData`.
    pub fields: &'static [&'static str],
}
