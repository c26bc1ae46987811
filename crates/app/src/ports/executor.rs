//! Rule executor port — the inbound surface for running a rule on demand.

use std::future::Future;

use rulehub_domain::error::RuleHubError;
use rulehub_domain::event::ExecutionContext;
use rulehub_domain::id::RuleId;

use crate::engine::ExecutionOutcome;

/// Runs a stored rule against a caller-supplied context.
///
/// Backs the `testRule` API: the same code path as live execution, without
/// requiring a real triggering event.
pub trait RuleExecutor {
    /// Load the rule and execute it against `context`.
    ///
    /// The rule does not need to be active; activity gates only live
    /// matching.
    fn execute_test(
        &self,
        rule_id: RuleId,
        context: ExecutionContext,
    ) -> impl Future<Output = Result<ExecutionOutcome, RuleHubError>> + Send;
}
