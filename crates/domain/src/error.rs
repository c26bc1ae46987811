//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`RuleHubError`]
//! via `#[from]` or by boxing the source (adapters).

/// Top-level error for the rulehub workspace.
#[derive(Debug, thiserror::Error)]
pub enum RuleHubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The storage layer failed; the source is the adapter's typed error.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An outbound channel (email, SMS, push, HTTP) failed.
    #[error("channel error")]
    Channel(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The rule name is empty.
    #[error("rule name must not be empty")]
    EmptyName,

    /// The rule has no actions.
    #[error("rule must have at least one action")]
    NoActions,

    /// The rule does not declare a trigger.
    #[error("rule must declare a trigger")]
    MissingTrigger,

    /// A provided identifier could not be parsed.
    #[error("malformed identifier: {0}")]
    MalformedId(String),
}

/// A record lookup came back empty.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// The kind of record, e.g. `"Rule"`.
    pub entity: &'static str,
    /// The identifier that was looked up.
    pub id: String,
}
