use crate::error::{Result, StoreError};
use opsdesk_core::domain::{normalize_phone_suffix, ContactOrigin, RawContact};
use opsdesk_core::rules::DigitKey;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

pub const PRIMARY_ROW_LIMIT: usize = 50;

const CONTACT_COLUMNS: &str = "id, first_name, last_name, phone, date_added";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_added: Option<String>,
}

impl From<ContactRow> for RawContact {
    fn from(row: ContactRow) -> Self {
        RawContact {
            origin: ContactOrigin::PrimaryStore,
            id: Some(row.id),
            contact_name: None,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            date_added: row.date_added,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactNew {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

pub struct ContactsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ContactsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now: &str, input: ContactNew) -> Result<ContactRow> {
        let first_name = clean(input.first_name);
        let last_name = clean(input.last_name);
        if first_name.is_none() && last_name.is_none() {
            return Err(StoreError::InvalidContact(
                "first or last name is required".to_string(),
            ));
        }
        let id = match clean(input.id) {
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };
        let phone = clean(input.phone);
        let suffix = phone
            .as_deref()
            .map(|value| normalize_phone_suffix(Some(value)))
            .filter(|suffix| !suffix.is_empty());

        self.conn.execute(
            "INSERT INTO contacts (id, first_name, last_name, phone, phone_suffix, date_added)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![id, first_name, last_name, phone, suffix, now],
        )?;

        Ok(ContactRow {
            id,
            first_name,
            last_name,
            phone,
            date_added: Some(now.to_string()),
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<ContactRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(contact_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Indexed suffix hit or a loose `LIKE '%digits'` match. The loose arm is
    /// a superset; callers re-check the normalized suffix.
    pub fn find_by_phone_suffix(&self, key: &DigitKey, limit: usize) -> Result<Vec<ContactRow>> {
        let pattern = format!("%{}", key.as_str());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE phone_suffix = ?1 OR phone LIKE ?2
             ORDER BY rowid
             LIMIT ?3;"
        ))?;
        let mut rows = stmt.query(params![key.as_str(), pattern, limit as i64])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(contact_from_row(row)?);
        }
        Ok(contacts)
    }

    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn contact_from_row(row: &Row<'_>) -> Result<ContactRow> {
    Ok(ContactRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone: row.get(3)?,
        date_added: row.get(4)?,
    })
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
