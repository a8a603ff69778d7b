use serde::{Deserialize, Serialize};

/// Alert delivery request published to NATS, one per contact
///
/// A gateway service subscribed to `alert.send.>` turns these into SMS/email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDeliveryMessage {
    pub alert_id: String,
    pub contact_id: String,
    pub contact_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub subject: String,
    pub body: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: String, // RFC3339 timestamp
}
