use opsdesk_config::DirectoryConfig;
use opsdesk_core::domain::{normalize_contacts, RawContact};
use opsdesk_core::dto::{DegradedSource, LookupOutcome};
use opsdesk_core::rules::{merge_matches, DigitKey, LookupRequest};
use opsdesk_core::time::now_iso;
use opsdesk_core::CoreError;
use opsdesk_directory::{
    scan_directory, DirectoryClient, DirectoryError, HttpDirectoryClient, HttpDirectoryConfig,
    ScanStop,
};
use opsdesk_store::error::Result as StoreResult;
use opsdesk_store::repo::PRIMARY_ROW_LIMIT;
use opsdesk_store::Store;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub trait PrimaryStore: Send + Sync {
    fn find_by_phone_suffix(&self, key: &DigitKey, limit: usize) -> StoreResult<Vec<RawContact>>;
}

/// Opens the database read-only for each lookup, so requests share nothing.
pub struct SqlitePrimaryStore {
    path: PathBuf,
}

impl SqlitePrimaryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PrimaryStore for SqlitePrimaryStore {
    fn find_by_phone_suffix(&self, key: &DigitKey, limit: usize) -> StoreResult<Vec<RawContact>> {
        let store = Store::open_read_only(&self.path)?;
        let rows = store.contacts().find_by_phone_suffix(key, limit)?;
        Ok(rows.into_iter().map(RawContact::from).collect())
    }
}

pub type SharedDirectory = Box<dyn DirectoryClient + Send + Sync>;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error("directory scan failed: {0}")]
    Directory(#[from] DirectoryError),
}

impl LookupError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, LookupError::Invalid(_))
    }
}

pub struct LookupService {
    primary: Option<Box<dyn PrimaryStore>>,
    directory: Option<SharedDirectory>,
}

impl LookupService {
    pub fn new(primary: Option<Box<dyn PrimaryStore>>, directory: Option<SharedDirectory>) -> Self {
        Self { primary, directory }
    }

    /// Builds the blocking HTTP client, so it must run outside the async
    /// runtime.
    pub fn from_config(
        db_path: Option<PathBuf>,
        directory: Option<&DirectoryConfig>,
    ) -> Result<Self, DirectoryError> {
        let primary = db_path
            .map(|path| Box::new(SqlitePrimaryStore::new(path)) as Box<dyn PrimaryStore>);
        let directory = match directory {
            Some(config) => Some(Box::new(HttpDirectoryClient::new(http_config(config))?)
                as SharedDirectory),
            None => None,
        };
        Ok(Self::new(primary, directory))
    }

    pub fn lookup(
        &self,
        digits: Option<&str>,
        pages: Option<&str>,
    ) -> Result<LookupOutcome, LookupError> {
        let request = LookupRequest::parse(digits, pages)?;
        self.run(&request, &now_iso())
    }

    pub fn run(&self, request: &LookupRequest, now: &str) -> Result<LookupOutcome, LookupError> {
        let mut degraded = Vec::new();
        let primary = self.query_primary(&request.key, &mut degraded);

        let (directory, pages_fetched) = match &self.directory {
            Some(client) => {
                let scan = scan_directory(&**client, request.pages)?;
                if let ScanStop::PageFailed { page, reason } = scan.stop {
                    degraded.push(DegradedSource::DirectoryPageFailed { page, reason });
                }
                (scan.contacts, scan.pages_fetched)
            }
            None => {
                debug!("directory not configured, skipping scan");
                degraded.push(DegradedSource::DirectoryUnconfigured);
                (Vec::new(), 0)
            }
        };

        let merged = merge_matches(&request.key, primary, directory);
        let outcome = LookupOutcome {
            contacts: normalize_contacts(merged, now),
            degraded,
            pages_fetched,
        };
        info!(
            digits = %request.key,
            results = outcome.contacts.len(),
            pages_fetched,
            partial = outcome.is_partial(),
            "customer lookup finished"
        );
        Ok(outcome)
    }

    fn query_primary(&self, key: &DigitKey, degraded: &mut Vec<DegradedSource>) -> Vec<RawContact> {
        let Some(primary) = &self.primary else {
            debug!("primary store not configured, skipping query");
            degraded.push(DegradedSource::PrimaryStoreUnconfigured);
            return Vec::new();
        };
        match primary.find_by_phone_suffix(key, PRIMARY_ROW_LIMIT) {
            Ok(contacts) => {
                debug!(rows = contacts.len(), "primary store matched");
                contacts
            }
            Err(err) => {
                warn!(error = %err, "primary store lookup failed, continuing with directory");
                degraded.push(DegradedSource::PrimaryStoreFailed {
                    reason: err.to_string(),
                });
                Vec::new()
            }
        }
    }
}

pub fn http_config(config: &DirectoryConfig) -> HttpDirectoryConfig {
    HttpDirectoryConfig {
        base_url: config.base_url.clone(),
        token: config.token.clone(),
        location_id: config.location_id.clone(),
        api_version: config.api_version.clone(),
        page_size: config.page_size,
        user_agent: config.user_agent.clone(),
        timeout: config.timeout_secs.map(Duration::from_secs),
    }
}
