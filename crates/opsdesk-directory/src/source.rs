use crate::Result;
use opsdesk_core::domain::RawContact;

pub trait DirectoryClient {
    fn source_name(&self) -> &'static str;
    /// Pages are numbered from 1. An empty vector means the directory is
    /// exhausted.
    fn fetch_page(&self, page: u32) -> Result<Vec<RawContact>>;
}
