//! Automation rule — an org-scoped binding of one trigger, AND-ed
//! conditions, and an ordered action list.

use serde::{Deserialize, Serialize};

use crate::action::ActionInstance;
use crate::condition::Condition;
use crate::error::{RuleHubError, ValidationError};
use crate::id::{OrganizationId, RuleId};
use crate::time::Timestamp;
use crate::trigger::TriggerKind;

/// A rule that reacts to trigger events by executing actions.
///
/// The engine never mutates `trigger`, `conditions`, or `actions`; only the
/// execution metadata (`execution_count`, `error_count`, `last_executed`,
/// `last_error`) changes as invocations happen, and only through the
/// repository's atomic increment operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub organization_id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub trigger: TriggerKind,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub actions: Vec<ActionInstance>,
    pub is_active: bool,
    #[serde(default)]
    pub execution_count: i64,
    #[serde(default)]
    pub error_count: i64,
    pub last_executed: Option<Timestamp>,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RuleHubError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    pub fn validate(&self) -> Result<(), RuleHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    organization_id: Option<OrganizationId>,
    name: Option<String>,
    description: Option<String>,
    trigger: Option<TriggerKind>,
    conditions: Vec<Condition>,
    actions: Vec<ActionInstance>,
    is_active: Option<bool>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn organization_id(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: TriggerKind) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: ActionInstance) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// Execution metadata starts zeroed; `created_at` is stamped now.
    ///
    /// # Errors
    ///
    /// Returns [`RuleHubError::Validation`] if required fields are missing
    /// or empty.
    pub fn build(self) -> Result<AutomationRule, RuleHubError> {
        let trigger = self.trigger.ok_or(ValidationError::MissingTrigger)?;
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            organization_id: self.organization_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            trigger,
            conditions: self.conditions,
            actions: self.actions,
            is_active: self.is_active.unwrap_or(true),
            execution_count: 0,
            error_count: 0,
            last_executed: None,
            last_error: None,
            created_at: crate::time::now(),
        };
        rule.validate()?;
        Ok(rule)
    }
}
