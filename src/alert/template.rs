use chrono::{DateTime, TimeZone};

use crate::rights::Language;

pub const LOCATION_UNAVAILABLE: &str = "Location unavailable";

/// Alert subject and body with `{location}` / `{timestamp}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTemplate {
    pub subject: &'static str,
    pub message: &'static str,
}

impl AlertTemplate {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::En => Self {
                subject: "Emergency Alert - Police Encounter",
                message: "I am currently in a police encounter at {location}. This is an automated alert from KnowYourRights Cards. Time: {timestamp}",
            },
            Language::Es => Self {
                subject: "Alerta de Emergencia - Encuentro Policial",
                message: "Actualmente estoy en un encuentro policial en {location}. Esta es una alerta automática de KnowYourRights Cards. Hora: {timestamp}",
            },
        }
    }

    pub fn render(&self, location: &str, timestamp: &str) -> String {
        self.message
            .replace("{location}", location)
            .replace("{timestamp}", timestamp)
    }
}

/// `M/D/YYYY, h:mm:ss AM`
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
