pub mod envelope;
pub mod error;
pub mod http;
pub mod scan;
pub mod source;

pub use error::{DirectoryError, Result};
pub use http::{HttpDirectoryClient, HttpDirectoryConfig};
pub use scan::{scan_directory, DirectoryScan, ScanStop};
pub use source::DirectoryClient;
