use crate::domain::Contact;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DegradedSource {
    PrimaryStoreUnconfigured,
    PrimaryStoreFailed { reason: String },
    DirectoryUnconfigured,
    DirectoryPageFailed { page: u32, reason: String },
}

/// Everything one lookup produced, including which sources were skipped or
/// cut short along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOutcome {
    pub contacts: Vec<Contact>,
    pub degraded: Vec<DegradedSource>,
    pub pages_fetched: u32,
}

impl LookupOutcome {
    pub fn is_partial(&self) -> bool {
        self.degraded.iter().any(|source| {
            matches!(
                source,
                DegradedSource::PrimaryStoreFailed { .. } | DegradedSource::DirectoryPageFailed { .. }
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LookupResponse {
    pub fn success(results: Vec<Contact>) -> Self {
        Self {
            ok: true,
            results: Some(results),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            results: None,
            error: Some(error.into()),
        }
    }
}

impl From<LookupOutcome> for LookupResponse {
    fn from(outcome: LookupOutcome) -> Self {
        Self::success(outcome.contacts)
    }
}
