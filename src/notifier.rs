use crate::log_entry::LogEntry;
use crate::messenger::Messenger;
use anyhow::Result;
use log::info;
use std::time::Duration;
use tokio::time::sleep;

const HEADER: &str = "Update in your delivery!";

struct Delivery {
    messenger: Box<dyn Messenger>,
    recipient: String,
}

/// Sends a summary of new entries to the configured recipient, if any.
pub struct Notifier {
    delivery: Option<Delivery>,
    url: String,
    lead_time: Duration,
    cooldown: Duration,
}

impl Notifier {
    pub fn new(
        messenger: Box<dyn Messenger>,
        recipient: &str,
        url: &str,
        lead_time: Duration,
        cooldown: Duration,
    ) -> Self {
        let recipient = recipient.trim();
        let delivery = (!recipient.is_empty()).then(|| Delivery {
            messenger,
            recipient: recipient.to_string(),
        });

        Self {
            delivery,
            url: url.to_string(),
            lead_time,
            cooldown,
        }
    }

    /// A notifier with no recipient; [`notify`](Self::notify) does nothing.
    pub fn disabled(url: &str) -> Self {
        Self {
            delivery: None,
            url: url.to_string(),
            lead_time: Duration::ZERO,
            cooldown: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.delivery.is_some()
    }

    /// Returns `true` if a message was sent.
    pub async fn notify(&self, added: &[LogEntry]) -> Result<bool> {
        let Some(delivery) = &self.delivery else {
            return Ok(false);
        };

        let text = compose_message(added, &self.url);

        info!("Sending notification...");
        delivery
            .messenger
            .send_now(&delivery.recipient, &text, self.lead_time)
            .await?;
        info!("Notification sent");

        sleep(self.cooldown).await;
        Ok(true)
    }
}

pub fn compose_message(added: &[LogEntry], url: &str) -> String {
    let mut msg = format!("{}\n\n", HEADER);
    for entry in added {
        msg.push_str(&format!("  - {}\n", entry));
    }
    msg.push_str(&format!("\nURL: {}", url));
    msg
}
