//! Rule service — use-cases for authoring and inspecting automation rules.

use rulehub_domain::error::{NotFoundError, RuleHubError};
use rulehub_domain::id::{OrganizationId, RuleId};
use rulehub_domain::log::ExecutionLog;
use rulehub_domain::rule::AutomationRule;

use crate::ports::{LogStore, RuleRepository};

/// Application service for rule CRUD, toggling, and log queries.
pub struct RuleService<RR, LS> {
    rules: RR,
    logs: LS,
}

impl<RR: RuleRepository, LS: LogStore> RuleService<RR, LS> {
    /// Create a new service backed by the given repository and log store.
    pub fn new(rules: RR, logs: LS) -> Self {
        Self { rules, logs }
    }

    /// Create a new rule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RuleHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(&self, rule: AutomationRule) -> Result<AutomationRule, RuleHubError> {
        rule.validate()?;
        self.rules.create(rule).await
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`RuleHubError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<AutomationRule, RuleHubError> {
        self.rules.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rules owned by an organization.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<AutomationRule>, RuleHubError> {
        self.rules.get_by_organization(organization_id).await
    }

    /// Update an existing rule.
    ///
    /// Execution metadata is owned by the engine; callers should carry over
    /// the stored counters rather than resetting them.
    ///
    /// # Errors
    ///
    /// Returns [`RuleHubError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, rule))]
    pub async fn update_rule(&self, rule: AutomationRule) -> Result<AutomationRule, RuleHubError> {
        rule.validate()?;
        self.rules.update(rule).await
    }

    /// Enable or disable a rule for future matching.
    ///
    /// Invocations already in flight are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`RuleHubError::NotFound`] when the rule does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(&self, id: RuleId, is_active: bool) -> Result<(), RuleHubError> {
        self.rules.set_active(id, is_active).await
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), RuleHubError> {
        self.rules.delete(id).await
    }

    /// Fetch the most recent execution logs for a rule, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log store.
    pub async fn get_rule_logs(
        &self,
        rule_id: RuleId,
        limit: usize,
    ) -> Result<Vec<ExecutionLog>, RuleHubError> {
        self.logs.find_by_rule(rule_id, limit).await
    }
}
