use crate::source::DirectoryClient;
use crate::Result;
use opsdesk_core::domain::RawContact;
use opsdesk_core::rules::PageCeiling;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStop {
    CeilingReached,
    EndOfDirectory { page: u32 },
    PageFailed { page: u32, reason: String },
}

#[derive(Debug, Clone)]
pub struct DirectoryScan {
    pub contacts: Vec<RawContact>,
    pub pages_fetched: u32,
    pub stop: ScanStop,
}

/// Walks pages `1..=ceiling` in order. A page that fails to fetch ends the
/// scan with whatever was collected; only errors that are not page failures
/// propagate.
pub fn scan_directory<C>(client: &C, ceiling: PageCeiling) -> Result<DirectoryScan>
where
    C: DirectoryClient + ?Sized,
{
    let mut contacts = Vec::new();
    let mut pages_fetched = 0;

    for page in 1..=ceiling.get() {
        let batch = match client.fetch_page(page) {
            Ok(batch) => batch,
            Err(err) if err.is_page_failure() => {
                warn!(
                    source = client.source_name(),
                    page,
                    error = %err,
                    "directory page failed, keeping partial results"
                );
                return Ok(DirectoryScan {
                    contacts,
                    pages_fetched,
                    stop: ScanStop::PageFailed {
                        page,
                        reason: err.to_string(),
                    },
                });
            }
            Err(err) => return Err(err),
        };
        pages_fetched += 1;

        if batch.is_empty() {
            debug!(source = client.source_name(), page, "directory exhausted");
            return Ok(DirectoryScan {
                contacts,
                pages_fetched,
                stop: ScanStop::EndOfDirectory { page },
            });
        }
        debug!(
            source = client.source_name(),
            page,
            records = batch.len(),
            "directory page fetched"
        );
        contacts.extend(batch);
    }

    Ok(DirectoryScan {
        contacts,
        pages_fetched,
        stop: ScanStop::CeilingReached,
    })
}
