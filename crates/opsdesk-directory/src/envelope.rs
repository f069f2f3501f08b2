use crate::{DirectoryError, Result};
use opsdesk_core::domain::{ContactOrigin, RawContact};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, alias = "contact_name", deserialize_with = "lenient_string")]
    contact_name: Option<String>,
    #[serde(default, alias = "first_name", deserialize_with = "lenient_string")]
    first_name: Option<String>,
    #[serde(default, alias = "last_name", deserialize_with = "lenient_string")]
    last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    phone: Option<String>,
    #[serde(default, alias = "date_added", deserialize_with = "lenient_string")]
    date_added: Option<String>,
}

impl From<DirectoryRecord> for RawContact {
    fn from(record: DirectoryRecord) -> Self {
        RawContact {
            origin: ContactOrigin::Directory,
            id: record.id,
            contact_name: record.contact_name,
            first_name: record.first_name,
            last_name: record.last_name,
            phone: record.phone,
            date_added: record.date_added,
        }
    }
}

/// Strings pass through and numbers are stringified; anything else is
/// treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Parses one page body. A blank body counts as an empty page; a body that
/// is not JSON is an error.
pub fn parse_page(body: &str) -> Result<Vec<RawContact>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value =
        serde_json::from_str(body).map_err(|err| DirectoryError::Decode(err.to_string()))?;
    Ok(contacts_from_value(&value))
}

/// Accepts `{contacts: [...]}` or `{contacts: {contacts: [...]}}`. Any other
/// shape is an empty page.
pub fn contacts_from_value(value: &Value) -> Vec<RawContact> {
    let items = match value.get("contacts") {
        Some(Value::Array(items)) => items,
        Some(Value::Object(inner)) => match inner.get("contacts") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let mut contacts = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            debug!("skipping non-object directory record");
            continue;
        }
        match DirectoryRecord::deserialize(item) {
            Ok(record) => contacts.push(record.into()),
            Err(err) => debug!(error = %err, "skipping unreadable directory record"),
        }
    }
    contacts
}
