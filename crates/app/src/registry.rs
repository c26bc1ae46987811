//! Trigger and action registries — the fixed built-in catalogs.
//!
//! Registries are plain in-memory catalogs populated once at engine
//! construction and only read afterwards. They drive config validation and
//! the rule-builder UI's metadata endpoints.

use rulehub_domain::action::{ActionDefinition, ActionKind, ConfigField, FieldType};
use rulehub_domain::trigger::{TriggerDefinition, TriggerKind};

/// Catalog of available trigger kinds, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TriggerRegistry {
    entries: Vec<TriggerDefinition>,
}

impl TriggerRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in trigger catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in builtin_triggers() {
            registry.register(definition);
        }
        registry
    }

    /// Add a definition, replacing any existing one for the same kind.
    pub fn register(&mut self, definition: TriggerDefinition) {
        match self.entries.iter_mut().find(|d| d.kind == definition.kind) {
            Some(existing) => *existing = definition,
            None => self.entries.push(definition),
        }
    }

    /// Look up the definition for a trigger kind.
    #[must_use]
    pub fn get(&self, kind: TriggerKind) -> Option<&TriggerDefinition> {
        self.entries.iter().find(|d| d.kind == kind)
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn list(&self) -> &[TriggerDefinition] {
        &self.entries
    }
}

/// Catalog of available action kinds, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    entries: Vec<ActionDefinition>,
}

impl ActionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in action catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in builtin_actions() {
            registry.register(definition);
        }
        registry
    }

    /// Add a definition, replacing any existing one for the same kind.
    pub fn register(&mut self, definition: ActionDefinition) {
        match self.entries.iter_mut().find(|d| d.kind == definition.kind) {
            Some(existing) => *existing = definition,
            None => self.entries.push(definition),
        }
    }

    /// Look up the definition for an action kind.
    #[must_use]
    pub fn get(&self, kind: ActionKind) -> Option<&ActionDefinition> {
        self.entries.iter().find(|d| d.kind == kind)
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn list(&self) -> &[ActionDefinition] {
        &self.entries
    }
}

fn builtin_triggers() -> Vec<TriggerDefinition> {
    vec![
        TriggerDefinition {
            kind: TriggerKind::BottleCreated,
            name: "Bottle Created",
            description: "Fires when a new bottle is created",
            fields: &["id", "serial_number", "status", "location", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::BottleUpdated,
            name: "Bottle Updated",
            description: "Fires when a bottle is updated",
            fields: &["id", "serial_number", "status", "location", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::BottleStatusChanged,
            name: "Bottle Status Changed",
            description: "Fires when a bottle's status changes",
            fields: &["id", "serial_number", "status", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::RentalCreated,
            name: "Rental Created",
            description: "Fires when a new rental is created",
            fields: &[
                "id",
                "customer_id",
                "bottle_id",
                "rental_start_date",
                "daily_rate",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::RentalUpdated,
            name: "Rental Updated",
            description: "Fires when a rental is updated",
            fields: &["id", "customer_id", "bottle_id", "status", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::RentalCompleted,
            name: "Rental Completed",
            description: "Fires when a rental is completed",
            fields: &[
                "id",
                "customer_id",
                "bottle_id",
                "rental_end_date",
                "total_amount",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::RentalOverdue,
            name: "Rental Overdue",
            description: "Fires when a rental becomes overdue",
            fields: &[
                "id",
                "customer_id",
                "bottle_id",
                "overdue_days",
                "amount_due",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::DeliveryScheduled,
            name: "Delivery Scheduled",
            description: "Fires when a delivery is scheduled",
            fields: &["id", "customer_id", "delivery_date", "driver_id", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::DeliveryStarted,
            name: "Delivery Started",
            description: "Fires when a delivery starts",
            fields: &["id", "customer_id", "driver_id", "started_at", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::DeliveryCompleted,
            name: "Delivery Completed",
            description: "Fires when a delivery is completed",
            fields: &[
                "id",
                "customer_id",
                "driver_id",
                "completed_at",
                "signature",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::MaintenanceDue,
            name: "Maintenance Due",
            description: "Fires when maintenance becomes due",
            fields: &["id", "bottle_id", "maintenance_type", "due_date", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::MaintenanceScheduled,
            name: "Maintenance Scheduled",
            description: "Fires when maintenance is scheduled",
            fields: &[
                "id",
                "bottle_id",
                "maintenance_type",
                "scheduled_date",
                "technician_id",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::MaintenanceCompleted,
            name: "Maintenance Completed",
            description: "Fires when maintenance is completed",
            fields: &[
                "id",
                "bottle_id",
                "maintenance_type",
                "completed_date",
                "technician_id",
                "cost",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::CustomerCreated,
            name: "Customer Created",
            description: "Fires when a new customer is created",
            fields: &["id", "name", "email", "phone", "customer_type", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::CustomerUpdated,
            name: "Customer Updated",
            description: "Fires when a customer is updated",
            fields: &["id", "name", "email", "phone", "organization_id"],
        },
        TriggerDefinition {
            kind: TriggerKind::InvoiceCreated,
            name: "Invoice Created",
            description: "Fires when an invoice is created",
            fields: &[
                "id",
                "customer_id",
                "invoice_number",
                "total_amount",
                "due_date",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::InvoiceOverdue,
            name: "Invoice Overdue",
            description: "Fires when an invoice becomes overdue",
            fields: &[
                "id",
                "customer_id",
                "invoice_number",
                "overdue_days",
                "amount_due",
                "organization_id",
            ],
        },
        TriggerDefinition {
            kind: TriggerKind::PaymentReceived,
            name: "Payment Received",
            description: "Fires when a payment is received",
            fields: &[
                "id",
                "customer_id",
                "invoice_id",
                "amount",
                "payment_method",
                "organization_id",
            ],
        },
    ]
}

fn builtin_actions() -> Vec<ActionDefinition> {
    vec![
        ActionDefinition {
            kind: ActionKind::SendEmail,
            name: "Send Email",
            description: "Send an email notification",
            config_fields: &[
                ConfigField {
                    name: "to",
                    field_type: FieldType::String,
                    required: true,
                    description: "Recipient email address",
                },
                ConfigField {
                    name: "subject",
                    field_type: FieldType::String,
                    required: true,
                    description: "Email subject",
                },
                ConfigField {
                    name: "body",
                    field_type: FieldType::Text,
                    required: true,
                    description: "Email body",
                },
                ConfigField {
                    name: "template",
                    field_type: FieldType::String,
                    required: false,
                    description: "Email template ID",
                },
            ],
        },
        ActionDefinition {
            kind: ActionKind::SendSms,
            name: "Send SMS",
            description: "Send an SMS notification",
            config_fields: &[
                ConfigField {
                    name: "phoneNumber",
                    field_type: FieldType::String,
                    required: true,
                    description: "Recipient phone number",
                },
                ConfigField {
                    name: "message",
                    field_type: FieldType::Text,
                    required: true,
                    description: "SMS message",
                },
                ConfigField {
                    name: "template",
                    field_type: FieldType::String,
                    required: false,
                    description: "SMS template ID",
                },
            ],
        },
        ActionDefinition {
            kind: ActionKind::CreateTask,
            name: "Create Task",
            description: "Create a new task",
            config_fields: &[
                ConfigField {
                    name: "title",
                    field_type: FieldType::String,
                    required: true,
                    description: "Task title",
                },
                ConfigField {
                    name: "description",
                    field_type: FieldType::Text,
                    required: false,
                    description: "Task description",
                },
                ConfigField {
                    name: "assignedTo",
                    field_type: FieldType::String,
                    required: false,
                    description: "User ID to assign the task to",
                },
                ConfigField {
                    name: "dueDate",
                    field_type: FieldType::Date,
                    required: false,
                    description: "Task due date",
                },
                ConfigField {
                    name: "priority",
                    field_type: FieldType::String,
                    required: false,
                    description: "Task priority",
                },
            ],
        },
        ActionDefinition {
            kind: ActionKind::UpdateRecord,
            name: "Update Record",
            description: "Update a database record",
            config_fields: &[
                ConfigField {
                    name: "table",
                    field_type: FieldType::String,
                    required: true,
                    description: "Table name",
                },
                ConfigField {
                    name: "recordId",
                    field_type: FieldType::String,
                    required: true,
                    description: "Record ID",
                },
                ConfigField {
                    name: "updates",
                    field_type: FieldType::Json,
                    required: true,
                    description: "Fields to update",
                },
            ],
        },
        ActionDefinition {
            kind: ActionKind::TriggerWebhook,
            name: "Trigger Webhook",
            description: "Send data to a webhook URL",
            config_fields: &[
                ConfigField {
                    name: "url",
                    field_type: FieldType::String,
                    required: true,
                    description: "Webhook URL",
                },
                ConfigField {
                    name: "method",
                    field_type: FieldType::String,
                    required: false,
                    description: "HTTP method (POST, PUT, PATCH)",
                },
                ConfigField {
                    name: "headers",
                    field_type: FieldType::Json,
                    required: false,
                    description: "Custom headers",
                },
                ConfigField {
                    name: "data",
                    field_type: FieldType::Json,
                    required: false,
                    description: "Data to send",
                },
            ],
        },
        ActionDefinition {
            kind: ActionKind::SendNotification,
            name: "Send Notification",
            description: "Send a push notification",
            config_fields: &[
                ConfigField {
                    name: "userId",
                    field_type: FieldType::String,
                    required: true,
                    description: "User ID to notify",
                },
                ConfigField {
                    name: "title",
                    field_type: FieldType::String,
                    required: true,
                    description: "Notification title",
                },
                ConfigField {
                    name: "body",
                    field_type: FieldType::Text,
                    required: true,
                    description: "Notification body",
                },
                ConfigField {
                    name: "data",
                    field_type: FieldType::Json,
                    required: false,
                    description: "Additional data",
                },
            ],
        },
        ActionDefinition {
            kind: ActionKind::Delay,
            name: "Delay",
            description: "Wait before running the next action",
            config_fields: &[
                ConfigField {
                    name: "duration",
                    field_type: FieldType::Number,
                    required: true,
                    description: "Delay duration",
                },
                ConfigField {
                    name: "unit",
                    field_type: FieldType::String,
                    required: false,
                    description: "Time unit (seconds, minutes, hours, days)",
                },
            ],
        },
        ActionDefinition {
            kind: ActionKind::Conditional,
            name: "Conditional",
            description: "Execute one of two action lists based on a condition",
            config_fields: &[
                ConfigField {
                    name: "condition",
                    field_type: FieldType::Json,
                    required: true,
                    description: "Condition to evaluate",
                },
                ConfigField {
                    name: "trueActions",
                    field_type: FieldType::Json,
                    required: false,
                    description: "Actions to execute if the condition is true",
                },
                ConfigField {
                    name: "falseActions",
                    field_type: FieldType::Json,
                    required: false,
                    description: "Actions to execute if the condition is false",
                },
            ],
        },
    ]
}
