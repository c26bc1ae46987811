//! Outbound channel ports — email, SMS, push, and raw HTTP.
//!
//! Implementations must bound every call with a timeout; a hung endpoint
//! fails the action, it never stalls the rule.

use std::future::Future;

use rulehub_domain::error::RuleHubError;

/// Sends transactional email.
pub trait EmailSender {
    /// Deliver a message; returns the provider's message id.
    fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<String, RuleHubError>> + Send;
}

/// Sends SMS messages.
pub trait SmsSender {
    /// Deliver a message; returns the provider's message id.
    fn send(
        &self,
        phone: &str,
        message: &str,
    ) -> impl Future<Output = Result<String, RuleHubError>> + Send;
}

/// Sends push notifications to users.
pub trait PushNotifier {
    /// Deliver a notification; returns the provider's notification id.
    fn send(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        data: Option<&serde_json::Value>,
    ) -> impl Future<Output = Result<String, RuleHubError>> + Send;
}

/// Response of a raw outbound HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues outbound HTTP requests (webhooks).
///
/// Transport failures are errors; non-2xx responses are returned as values —
/// the caller decides what counts as failure.
pub trait HttpClient {
    fn request(
        &self,
        url: &str,
        method: &str,
        headers: Option<&serde_json::Map<String, serde_json::Value>>,
        body: Option<&serde_json::Value>,
    ) -> impl Future<Output = Result<HttpResponse, RuleHubError>> + Send;
}
