//! Emergency alert flow
//!
//! Contacts are stored locally; an alert combines a message template with
//! the current position (best effort) and is handed to a delivery channel.

mod contact;
mod flow;
mod location;
mod sender;
mod template;

pub use contact::{validate_phone_number, ContactBook, EmergencyContact, DEFAULT_MAX_CONTACTS};
pub use flow::{AlertReceipt, EmergencyAlertFlow};
pub use location::{Coordinates, LocationProvider, StaticLocation};
pub use sender::{delivery_message, AlertMessage, AlertSender, LogAlertSender, NatsAlertSender};
pub use template::{format_timestamp, AlertTemplate, LOCATION_UNAVAILABLE};
