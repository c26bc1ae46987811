//! Rule repository port — persistence for automation rules.

use std::future::Future;

use rulehub_domain::error::RuleHubError;
use rulehub_domain::id::{OrganizationId, RuleId};
use rulehub_domain::rule::AutomationRule;
use rulehub_domain::time::Timestamp;
use rulehub_domain::trigger::TriggerKind;

/// Repository for persisting and querying [`AutomationRule`]s.
///
/// The counter methods MUST be atomic read-modify-write at the store:
/// concurrent executions of the same rule would otherwise lose updates.
pub trait RuleRepository {
    /// Create a new rule in storage.
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, RuleHubError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, RuleHubError>> + Send;

    /// Get all rules owned by an organization, newest first.
    fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, RuleHubError>> + Send;

    /// Get the active rules of an organization bound to a trigger.
    fn list_active(
        &self,
        organization_id: OrganizationId,
        trigger: TriggerKind,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, RuleHubError>> + Send;

    /// Update an existing rule.
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, RuleHubError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), RuleHubError>> + Send;

    /// Enable or disable a rule for future matching.
    fn set_active(
        &self,
        id: RuleId,
        is_active: bool,
    ) -> impl Future<Output = Result<(), RuleHubError>> + Send;

    /// Atomically increment `execution_count` and stamp `last_executed`.
    fn increment_execution(
        &self,
        id: RuleId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), RuleHubError>> + Send;

    /// Atomically increment `error_count` and record `last_error`.
    fn increment_error(
        &self,
        id: RuleId,
        message: &str,
    ) -> impl Future<Output = Result<(), RuleHubError>> + Send;
}
