use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ContactError;
use crate::storage::Persistence;

/// Hard cap on stored emergency contacts
pub const DEFAULT_MAX_CONTACTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The user's emergency contacts, persisted on every change
pub struct ContactBook {
    persistence: Persistence,
    contacts: RwLock<Vec<EmergencyContact>>,
    max_contacts: usize,
}

impl ContactBook {
    /// Load the stored contact list once
    pub fn load(persistence: Persistence, max_contacts: usize) -> Self {
        let mut contacts = persistence.contacts();
        if contacts.len() > max_contacts {
            contacts.truncate(max_contacts);
        }
        info!("Loaded {} emergency contacts", contacts.len());

        Self {
            persistence,
            contacts: RwLock::new(contacts),
            max_contacts,
        }
    }

    pub fn max_contacts(&self) -> usize {
        self.max_contacts
    }

    pub fn list(&self) -> Vec<EmergencyContact> {
        self.contacts.read().clone()
    }

    pub fn len(&self) -> usize {
        self.contacts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.read().is_empty()
    }

    pub fn add(
        &self,
        name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<EmergencyContact, ContactError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactError::InvalidName);
        }
        if !validate_phone_number(phone) {
            return Err(ContactError::InvalidPhone(phone.to_string()));
        }

        let mut contacts = self.contacts.write();
        if contacts.len() >= self.max_contacts {
            return Err(ContactError::LimitReached(self.max_contacts));
        }

        let contact = EmergencyContact {
            id: format!("contact_{}", uuid::Uuid::new_v4().simple()),
            name: name.to_string(),
            phone: phone.trim().to_string(),
            email: email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        };

        let mut updated = contacts.clone();
        updated.push(contact.clone());
        self.persistence.set_contacts(&updated)?;
        *contacts = updated;

        info!("Added emergency contact {}", contact.id);
        Ok(contact)
    }

    pub fn remove(&self, id: &str) -> Result<EmergencyContact, ContactError> {
        let mut contacts = self.contacts.write();
        let index = contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ContactError::NotFound(id.to_string()))?;

        let mut updated = contacts.clone();
        let removed = updated.remove(index);
        self.persistence.set_contacts(&updated)?;
        *contacts = updated;

        info!("Removed emergency contact {}", removed.id);
        Ok(removed)
    }
}

/// 10 to 15 digits, optional leading `+`, spaces/dashes/dots/parentheses
/// allowed as separators
pub fn validate_phone_number(phone: &str) -> bool {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    let mut count = 0;
    for c in digits.chars() {
        match c {
            '0'..='9' => count += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return false,
        }
    }

    (10..=15).contains(&count)
}
