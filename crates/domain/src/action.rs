//! Action — a named, configurable side-effecting operation a rule can perform.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// The built-in action catalog.
///
/// `Unknown` absorbs unrecognized ids at deserialization time so that a rule
/// carrying a bad action type still loads; execution of such an action fails
/// closed as a configuration error instead of poisoning the whole rule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SendEmail,
    SendSms,
    CreateTask,
    UpdateRecord,
    TriggerWebhook,
    SendNotification,
    Delay,
    Conditional,
    #[serde(other)]
    Unknown,
}

impl ActionKind {
    /// The snake_case id used in storage, logs, and the API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SendEmail => "send_email",
            Self::SendSms => "send_sms",
            Self::CreateTask => "create_task",
            Self::UpdateRecord => "update_record",
            Self::TriggerWebhook => "trigger_webhook",
            Self::SendNotification => "send_notification",
            Self::Delay => "delay",
            Self::Conditional => "conditional",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = std::convert::Infallible;

    /// Never fails; unrecognized ids map to [`ActionKind::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(
            serde_json::from_value(serde_json::Value::String(s.to_string()))
                .unwrap_or(Self::Unknown),
        )
    }
}

/// One configured action inside a rule's ordered action list.
///
/// `config` holds the handler-specific fields (possibly containing
/// `{{path}}` placeholders, or nested action lists for `conditional`);
/// it is parsed into the matching typed config struct at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInstance {
    /// Which handler runs this action.
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Handler-specific configuration.
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Value type of an action config field, used for validation and UI forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Text,
    Number,
    Date,
    Json,
}

/// Schema entry for one field of an action's configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub description: &'static str,
}

/// Catalog entry describing an action kind for validation and UI generation.
#[derive(Debug, Clone, Serialize)]
pub struct ActionDefinition {
    /// The action this definition describes.
    pub kind: ActionKind,
    /// Human-readable name, e.g. `"Send Email"`.
    pub name: &'static str,
    /// One-line description of what the action does.
    pub description: &'static str,
    /// Schema of the fields expected in [`ActionInstance::config`].
    pub config_fields: &'static [ConfigField],
}

// ---------------------------------------------------------------------------
// Typed per-handler configs, parsed from `ActionInstance::config`.
// Keys are camelCase as authored by the rule-builder UI.
// ---------------------------------------------------------------------------

/// Config for `send_email`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub template: Option<String>,
}

/// Config for `send_sms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsConfig {
    pub phone_number: String,
    pub message: String,
    #[serde(default)]
    pub template: Option<String>,
}

/// Config for `create_task`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Config for `update_record`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordConfig {
    pub table: String,
    pub record_id: String,
    pub updates: serde_json::Value,
}

/// Config for `trigger_webhook`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Config for `send_notification`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    pub user_id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Time unit for the `delay` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// Config for `delay`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayConfig {
    pub duration: u64,
    #[serde(default)]
    pub unit: DelayUnit,
}

impl DelayConfig {
    /// Total wait as a [`std::time::Duration`].
    #[must_use]
    pub fn as_duration(&self) -> std::time::Duration {
        let seconds = match self.unit {
            DelayUnit::Seconds => self.duration,
            DelayUnit::Minutes => self.duration * 60,
            DelayUnit::Hours => self.duration * 60 * 60,
            DelayUnit::Days => self.duration * 60 * 60 * 24,
        };
        std::time::Duration::from_secs(seconds)
    }
}

/// Config for `conditional` — one embedded condition selecting a sublist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalConfig {
    pub condition: Condition,
    #[serde(default)]
    pub true_actions: Vec<ActionInstance>,
    #[serde(default)]
    pub false_actions: Vec<ActionInstance>,
}
