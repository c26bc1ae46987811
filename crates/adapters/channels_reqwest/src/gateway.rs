//! Gateway clients for email, SMS, and push delivery.
//!
//! Each sender POSTs a JSON payload to its configured provider endpoint and
//! reads the delivery receipt (`{"id": "..."}`) from the response. Delivery
//! is considered failed on any transport error or non-2xx status.

use serde::Deserialize;
use tracing::debug;

use rulehub_app::ports::{EmailSender, PushNotifier, SmsSender};
use rulehub_domain::error::RuleHubError;

use crate::error::ChannelError;

#[derive(Debug, Deserialize)]
struct DeliveryReceipt {
    id: String,
}

async fn post_for_receipt(
    client: &reqwest::Client,
    endpoint: &str,
    payload: &serde_json::Value,
) -> Result<String, ChannelError> {
    let response = client
        .post(endpoint)
        .json(payload)
        .send()
        .await?
        .error_for_status()?;
    let receipt: DeliveryReceipt = response
        .json()
        .await
        .map_err(ChannelError::MalformedReceipt)?;
    Ok(receipt.id)
}

/// Email delivery via an HTTP mail gateway.
pub struct HttpEmailSender {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEmailSender {
    /// Create a sender posting to the given gateway endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl EmailSender for HttpEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, RuleHubError> {
        debug!(to, subject, "sending email");
        let payload = serde_json::json!({ "to": to, "subject": subject, "body": body });
        let id = post_for_receipt(&self.client, &self.endpoint, &payload).await?;
        Ok(id)
    }
}

/// SMS delivery via an HTTP messaging gateway.
pub struct HttpSmsSender {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSmsSender {
    /// Create a sender posting to the given gateway endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl SmsSender for HttpSmsSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, RuleHubError> {
        debug!(phone, "sending sms");
        let payload = serde_json::json!({ "to": phone, "message": message });
        let id = post_for_receipt(&self.client, &self.endpoint, &payload).await?;
        Ok(id)
    }
}

/// Push notification delivery via an HTTP notification gateway.
pub struct HttpPushNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPushNotifier {
    /// Create a notifier posting to the given gateway endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl PushNotifier for HttpPushNotifier {
    async fn send(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        data: Option<&serde_json::Value>,
    ) -> Result<String, RuleHubError> {
        debug!(user_id, title, "sending push notification");
        let payload = serde_json::json!({
            "userId": user_id,
            "title": title,
            "body": body,
            "data": data.cloned().unwrap_or(serde_json::Value::Null),
        });
        let id = post_for_receipt(&self.client, &self.endpoint, &payload).await?;
        Ok(id)
    }
}
