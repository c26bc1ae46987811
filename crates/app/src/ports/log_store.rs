//! Log store port — append-only persistence for execution logs.

use std::future::Future;

use rulehub_domain::error::RuleHubError;
use rulehub_domain::id::RuleId;
use rulehub_domain::log::ExecutionLog;

/// Append-only store for [`ExecutionLog`] records.
pub trait LogStore {
    /// Persist a new log entry.
    fn append(
        &self,
        log: ExecutionLog,
    ) -> impl Future<Output = Result<ExecutionLog, RuleHubError>> + Send;

    /// Find log entries for a rule, newest first.
    fn find_by_rule(
        &self,
        rule_id: RuleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionLog>, RuleHubError>> + Send;
}
