use anyhow::{Context, Result};
use async_nats::Client;
use tracing::{debug, info};

use super::messages::AlertDeliveryMessage;

pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Subject a contact's alert requests are published on
    pub fn alert_subject(contact_id: &str) -> String {
        format!("alert.send.{}", contact_id)
    }

    /// Publish one alert delivery request
    pub async fn publish_alert(&self, message: &AlertDeliveryMessage) -> Result<()> {
        let subject = Self::alert_subject(&message.contact_id);
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish alert")?;

        debug!("Published alert {} to {}", message.alert_id, subject);

        Ok(())
    }

    /// Wait until everything published so far reached the server
    pub async fn flush(&self) -> Result<()> {
        self.client
            .flush()
            .await
            .context("Failed to flush NATS connection")?;
        Ok(())
    }
}
