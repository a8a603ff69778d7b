use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::contact::EmergencyContact;
use super::location::{Coordinates, LocationProvider};
use super::sender::{AlertMessage, AlertSender};
use super::template::{format_timestamp, AlertTemplate, LOCATION_UNAVAILABLE};
use crate::error::{AlertError, LocationUnavailableError};
use crate::rights::Language;

/// What was sent, returned on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertReceipt {
    pub alert_id: String,
    pub subject: String,
    pub message: String,
    pub location: Option<Coordinates>,
    pub recipients: Vec<String>,
    pub sent_at: DateTime<Utc>,
}

/// Compose an alert with the live location and hand it to every contact
pub struct EmergencyAlertFlow {
    location: Arc<dyn LocationProvider>,
    sender: Arc<dyn AlertSender>,
    location_timeout: Duration,
}

impl EmergencyAlertFlow {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        sender: Arc<dyn AlertSender>,
        location_timeout: Duration,
    ) -> Self {
        Self {
            location,
            sender,
            location_timeout,
        }
    }

    /// Best-effort position fix bounded by the location timeout
    pub async fn locate(&self) -> Result<Coordinates, LocationUnavailableError> {
        tokio::time::timeout(self.location_timeout, self.location.current_position())
            .await
            .map_err(|_| {
                LocationUnavailableError::new(format!(
                    "no fix within {} ms",
                    self.location_timeout.as_millis()
                ))
            })?
    }

    /// Fails with `NoContacts` before any location or template work
    pub async fn send_alert(
        &self,
        contacts: &[EmergencyContact],
        language: Language,
    ) -> Result<AlertReceipt, AlertError> {
        if contacts.is_empty() {
            warn!("Alert requested with no emergency contacts");
            return Err(AlertError::NoContacts);
        }

        let location = match self.locate().await {
            Ok(position) => Some(position),
            Err(e) => {
                warn!("Could not get location: {}", e);
                None
            }
        };
        let location_text = location
            .map(|position| position.to_string())
            .unwrap_or_else(|| LOCATION_UNAVAILABLE.to_string());

        let sent_at = Utc::now();
        let template = AlertTemplate::for_language(language);
        let body = template.render(
            &location_text,
            &format_timestamp(&sent_at.with_timezone(&Local)),
        );

        let alert = AlertMessage {
            alert_id: format!("alert_{}", uuid::Uuid::new_v4().simple()),
            subject: template.subject.to_string(),
            body,
            location,
            timestamp: sent_at,
        };

        if let Err(e) = self.sender.send(contacts, &alert).await {
            error!("Failed to send emergency alert via {}: {}", self.sender.name(), e);
            return Err(e);
        }

        info!(
            "Emergency alert {} sent to {} contacts via {}",
            alert.alert_id,
            contacts.len(),
            self.sender.name()
        );

        Ok(AlertReceipt {
            alert_id: alert.alert_id,
            subject: alert.subject,
            message: alert.body,
            location,
            recipients: contacts.iter().map(|c| c.id.clone()).collect(),
            sent_at,
        })
    }
}
