//! Template store port — lookup for reusable message templates.

use std::future::Future;

use rulehub_domain::error::RuleHubError;

/// A reusable message template referenced by id from action configs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub id: String,
    /// Subject line; absent for SMS templates.
    pub subject: Option<String>,
    pub body: String,
}

/// Read access to stored message templates.
pub trait TemplateStore {
    /// Look up a template by id; `None` when it does not exist.
    fn get(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<MessageTemplate>, RuleHubError>> + Send;
}
