use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::contact::EmergencyContact;
use super::location::Coordinates;
use crate::error::AlertError;
use crate::nats::{AlertDeliveryMessage, NatsClient};

/// A rendered alert, ready to hand to a delivery channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub alert_id: String,
    pub subject: String,
    pub body: String,
    pub location: Option<Coordinates>,
    pub timestamp: DateTime<Utc>,
}

/// Delivery channel for alerts
///
/// Succeeds only if the whole contact set was handled.
#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(
        &self,
        contacts: &[EmergencyContact],
        alert: &AlertMessage,
    ) -> Result<(), AlertError>;

    fn name(&self) -> &str;
}

/// Writes alerts to the log instead of delivering them
#[derive(Debug, Default)]
pub struct LogAlertSender;

#[async_trait::async_trait]
impl AlertSender for LogAlertSender {
    async fn send(
        &self,
        contacts: &[EmergencyContact],
        alert: &AlertMessage,
    ) -> Result<(), AlertError> {
        for contact in contacts {
            info!(
                "Emergency alert {} for {} ({}): {}",
                alert.alert_id, contact.name, contact.phone, alert.body
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Publishes one delivery request per contact on NATS
pub struct NatsAlertSender {
    client: Arc<NatsClient>,
}

impl NatsAlertSender {
    pub fn new(client: Arc<NatsClient>) -> Self {
        Self { client }
    }
}

pub fn delivery_message(contact: &EmergencyContact, alert: &AlertMessage) -> AlertDeliveryMessage {
    AlertDeliveryMessage {
        alert_id: alert.alert_id.clone(),
        contact_id: contact.id.clone(),
        contact_name: contact.name.clone(),
        phone: contact.phone.clone(),
        email: contact.email.clone(),
        subject: alert.subject.clone(),
        body: alert.body.clone(),
        latitude: alert.location.map(|l| l.latitude),
        longitude: alert.location.map(|l| l.longitude),
        timestamp: alert.timestamp.to_rfc3339(),
    }
}

#[async_trait::async_trait]
impl AlertSender for NatsAlertSender {
    async fn send(
        &self,
        contacts: &[EmergencyContact],
        alert: &AlertMessage,
    ) -> Result<(), AlertError> {
        let messages: Vec<_> = contacts
            .iter()
            .map(|contact| delivery_message(contact, alert))
            .collect();

        let results = join_all(messages.iter().map(|m| self.client.publish_alert(m))).await;

        let failures: Vec<String> = results
            .into_iter()
            .filter_map(|r| r.err())
            .map(|e| format!("{:#}", e))
            .collect();

        if !failures.is_empty() {
            error!(
                "Alert {} failed for {} of {} contacts",
                alert.alert_id,
                failures.len(),
                contacts.len()
            );
            return Err(AlertError::Delivery(failures.join("; ")));
        }

        self.client
            .flush()
            .await
            .map_err(|e| AlertError::Delivery(format!("{:#}", e)))?;

        info!(
            "Alert {} published for {} contacts",
            alert.alert_id,
            contacts.len()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "nats"
    }
}
