//! Instant-messaging delivery.

use crate::config::WhatsAppConfig;
use crate::error::WatchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

/// WhatsApp Cloud API base URL.
const GRAPH_BASE: &str = "https://graph.facebook.com";

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to `recipient` right away, allowing the channel up to
    /// `lead_time` to accept it.
    async fn send_now(&self, recipient: &str, text: &str, lead_time: Duration) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Sends through the WhatsApp Business Cloud API.
pub struct WhatsAppMessenger {
    config: WhatsAppConfig,
    http: reqwest::Client,
}

impl WhatsAppMessenger {
    pub fn new(config: WhatsAppConfig) -> Result<Self> {
        if config.token.is_empty() || config.phone_number_id.is_empty() {
            return Err(WatchError::Config(
                "whatsapp.token and whatsapp.phone_number_id are required for notifications"
                    .to_string(),
            )
            .into());
        }

        Ok(Self {
            config,
            http: reqwest::Client::new(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            GRAPH_BASE, self.config.api_version, self.config.phone_number_id
        )
    }
}

/// Request body for a plain text message.
fn text_payload(recipient: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "to": normalize_number(recipient),
        "type": "text",
        "text": {
            "preview_url": false,
            "body": text,
        }
    })
}

/// The Cloud API expects digits only, without `+` or separators.
fn normalize_number(recipient: &str) -> String {
    recipient.chars().filter(char::is_ascii_digit).collect()
}

#[async_trait]
impl Messenger for WhatsAppMessenger {
    async fn send_now(&self, recipient: &str, text: &str, lead_time: Duration) -> Result<()> {
        let resp = self
            .http
            .post(self.messages_url())
            .bearer_auth(&self.config.token)
            .timeout(lead_time)
            .json(&text_payload(recipient, text))
            .send()
            .await
            .context("Failed to call WhatsApp send API")?;

        if !resp.status().is_success() {
            return Err(
                WatchError::Messenger(format!("WhatsApp send failed: {}", resp.status())).into(),
            );
        }

        let data: SendResponse = resp
            .json()
            .await
            .context("Failed to parse WhatsApp send response")?;

        if let Some(message) = data.messages.first() {
            debug!("WhatsApp accepted message {}", message.id);
        }

        Ok(())
    }
}
