use crate::domain::phone::normalize_phone_suffix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactOrigin {
    PrimaryStore,
    Directory,
}

impl ContactOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactOrigin::PrimaryStore => "primary_store",
            ContactOrigin::Directory => "directory",
        }
    }
}

/// A contact as sighted in one source, before any field defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContact {
    pub origin: ContactOrigin,
    pub id: Option<String>,
    pub contact_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_added: Option<String>,
}

impl RawContact {
    pub fn new(origin: ContactOrigin) -> Self {
        Self {
            origin,
            id: None,
            contact_name: None,
            first_name: None,
            last_name: None,
            phone: None,
            date_added: None,
        }
    }

    /// Missing ids collapse to the empty string, so at most one id-less
    /// record survives deduplication.
    pub fn dedup_key(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn phone_suffix(&self) -> String {
        normalize_phone_suffix(self.phone.as_deref())
    }

    pub fn into_contact(self, now: &str) -> Contact {
        let first_name = self.first_name.unwrap_or_default();
        let last_name = self.last_name.unwrap_or_default();
        let contact_name = match self.contact_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => format!("{first_name} {last_name}").trim().to_string(),
        };
        let date_added = match self.date_added {
            Some(value) if !value.trim().is_empty() => value,
            _ => now.to_string(),
        };

        Contact {
            id: self.id.unwrap_or_default(),
            contact_name,
            first_name,
            last_name,
            phone: self.phone,
            date_added,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub contact_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub date_added: String,
}

pub fn normalize_contacts(raw: Vec<RawContact>, now: &str) -> Vec<Contact> {
    raw.into_iter().map(|contact| contact.into_contact(now)).collect()
}
