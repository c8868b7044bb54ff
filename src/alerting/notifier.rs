//! # Outbound Messaging
//!
//! `Notifier` is the narrow seam to the messaging provider: one destination, one text, a delivery
//! report back. Implementations never return an error; a failed send is reported, logged and dropped.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use crate::config::NotificationSettings;
use crate::errors::DockQueueResult;

/// Destinations shorter than this are treated as missing and never sent
pub const MIN_DESTINATION_LEN: usize = 5;

/// The outcome of one send attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub delivered: bool,
    pub reason: Option<String>,
}

impl DeliveryReport {
    pub fn delivered() -> Self {
        Self { delivered: true, reason: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { delivered: false, reason: Some(reason.into()) }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text` to `destination`. Never fails; the report says what happened.
    async fn send(&self, destination: &str, text: &str) -> DeliveryReport;
}

/// Whether a destination is long enough to be a phone number or group id
pub fn is_sendable(destination: &str) -> bool {
    destination.trim().len() >= MIN_DESTINATION_LEN
}

/// Sends messages through the WhatsApp gateway (`{target, message, countryCode}` with an `Authorization` token)
pub struct WhatsAppNotifier {
    client: Client,
    api_url: String,
    token: Option<Secret<String>>,
    country_code: String,
}

#[derive(Debug, Deserialize)]
struct GatewayReply {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl WhatsAppNotifier {
    pub fn new(settings: &NotificationSettings) -> DockQueueResult<Self> {
        info!("Initializing WhatsApp notifier");
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            token: settings.token.clone(),
            country_code: settings.country_code.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn send(&self, destination: &str, text: &str) -> DeliveryReport {
        if !is_sendable(destination) {
            return DeliveryReport::failed("destination too short");
        }
        let Some(token) = &self.token else {
            error!("WhatsApp token is not configured");
            return DeliveryReport::failed("missing token");
        };

        let result = self.client.post(&self.api_url)
            .header("Authorization", token.expose_secret().as_str())
            .json(&json!({
                "target": destination,
                "message": text,
                "countryCode": self.country_code,
            }))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!("WhatsApp send to {} failed: {}", destination, e);
                return DeliveryReport::failed(e.to_string());
            }
        };

        if !response.status().is_success() {
            error!("WhatsApp gateway answered {}", response.status());
            return DeliveryReport::failed(format!("gateway status {}", response.status()));
        }

        match response.json::<GatewayReply>().await {
            Ok(reply) if reply.status => {
                info!("WhatsApp message sent to {}", destination);
                DeliveryReport::delivered()
            }
            Ok(reply) => {
                let reason = reply.reason.unwrap_or_else(|| "rejected by gateway".to_string());
                warn!("WhatsApp gateway warning: {}", reason);
                DeliveryReport::failed(reason)
            }
            Err(e) => {
                warn!("Unreadable WhatsApp gateway reply: {}", e);
                DeliveryReport::failed(e.to_string())
            }
        }
    }
}

/// Development notifier: writes the message to the log instead of sending it
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, destination: &str, text: &str) -> DeliveryReport {
        if !is_sendable(destination) {
            return DeliveryReport::failed("destination too short");
        }
        info!("[DEV MODE] WhatsApp to {}:\n{}", destination, text);
        DeliveryReport::delivered()
    }
}

/// Keeps every message it is asked to send. Used by tests and dry runs.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(destination, text)` pairs in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, destination: &str, text: &str) -> DeliveryReport {
        self.sent.lock().push((destination.to_string(), text.to_string()));
        if is_sendable(destination) {
            DeliveryReport::delivered()
        } else {
            DeliveryReport::failed("destination too short")
        }
    }
}
