//! Raw webhook client for the `trigger_webhook` action.

use tracing::debug;

use rulehub_app::ports::{HttpClient, HttpResponse};
use rulehub_domain::error::RuleHubError;

use crate::error::ChannelError;

/// [`HttpClient`] implementation backed by a shared [`reqwest::Client`].
///
/// Transport failures (connect, TLS, timeout) are errors; any HTTP response,
/// 2xx or not, is returned as a value — the engine decides what counts as an
/// action failure.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a webhook client from a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestHttpClient {
    async fn request(
        &self,
        url: &str,
        method: &str,
        headers: Option<&serde_json::Map<String, serde_json::Value>>,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, RuleHubError> {
        let method = reqwest::Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| ChannelError::Method(method.to_string()))?;
        debug!(%method, url, "issuing webhook request");

        let mut request = self.client.request(method, url);
        if let Some(headers) = headers {
            for (name, value) in headers {
                if let Some(text) = value.as_str() {
                    request = request.header(name.as_str(), text);
                }
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ChannelError::from)?;
        Ok(HttpResponse {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ReqwestHttpClient {
        ReqwestHttpClient::new(crate::build_client(std::time::Duration::from_secs(2)).unwrap())
    }

    #[tokio::test]
    async fn should_post_json_body_with_custom_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("x-signature", "abc"))
            .and(body_json(json!({"bottle": "B1"})))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let mut headers = serde_json::Map::new();
        headers.insert("x-signature".to_string(), json!("abc"));

        let response = client()
            .request(
                &format!("{}/hook", server.uri()),
                "POST",
                Some(&headers),
                Some(&json!({"bottle": "B1"})),
            )
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn should_return_error_statuses_as_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let response = client()
            .request(&format!("{}/hook", server.uri()), "POST", None, None)
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn should_support_configured_methods_case_insensitively() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let response = client()
            .request(&format!("{}/hook", server.uri()), "put", None, None)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn should_reject_malformed_method_token() {
        let result = client()
            .request("http://localhost/hook", "P O S T", None, None)
            .await;
        assert!(matches!(result, Err(RuleHubError::Channel(_))));
    }
}
