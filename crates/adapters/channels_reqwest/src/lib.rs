//! # rulehub-adapter-channels-reqwest
//!
//! Outbound channel adapter using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the channel port traits from `rulehub-app::ports::channels`
//! - Email/SMS/push delivery as JSON POSTs to configured gateway endpoints
//! - Raw webhook requests for the `trigger_webhook` action
//! - Enforce a bounded timeout on every outbound call — a hung endpoint
//!   fails the action instead of stalling the rule
//!
//! ## Dependency rule
//! Depends on `rulehub-app` (port traits) and `rulehub-domain` only.

pub mod error;
pub mod gateway;
pub mod webhook;

pub use error::ChannelError;
pub use gateway::{HttpEmailSender, HttpPushNotifier, HttpSmsSender};
pub use webhook::ReqwestHttpClient;

use std::time::Duration;

/// Build the shared HTTP client with the adapter-wide request timeout.
///
/// # Errors
///
/// Returns [`ChannelError`] if the TLS backend fails to initialize.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ChannelError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ChannelError::from)
}
