//! Channel-specific error type wrapping reqwest errors.

use rulehub_domain::error::RuleHubError;

/// Errors originating from the outbound channel layer.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Connection, TLS, or timeout failure — or a gateway status error.
    #[error("http transport error")]
    Transport(#[from] reqwest::Error),

    /// The configured HTTP method is not a valid token.
    #[error("unsupported http method: {0}")]
    Method(String),

    /// A gateway response did not carry the expected receipt payload.
    #[error("malformed gateway response")]
    MalformedReceipt(#[source] reqwest::Error),
}

impl From<ChannelError> for RuleHubError {
    fn from(err: ChannelError) -> Self {
        Self::Channel(Box::new(err))
    }
}
