//! Record store port — generic row access for task and record actions.

use std::future::Future;

use rulehub_domain::error::RuleHubError;

/// Generic insert/update access to named domain tables.
///
/// Used by the `create_task` and `update_record` action handlers; the
/// implementation is responsible for validating the table name.
pub trait RecordStore {
    /// Insert a row and return its generated id.
    fn insert(
        &self,
        table: &str,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> impl Future<Output = Result<String, RuleHubError>> + Send;

    /// Apply a targeted update to one row.
    ///
    /// Implementations return [`RuleHubError::NotFound`] when the row does
    /// not exist.
    fn update(
        &self,
        table: &str,
        record_id: &str,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> impl Future<Output = Result<(), RuleHubError>> + Send;
}
