use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[cfg(feature = "http-directory")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "http-directory")]
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("page {page} returned status {status}")]
    Status { page: u32, status: u16 },
    #[error("malformed directory response: {0}")]
    Decode(String),
    #[error("invalid directory config: {0}")]
    Config(String),
    #[error("{0}")]
    Unavailable(String),
}

impl DirectoryError {
    /// Failures that end a scan early but keep what was already collected.
    pub fn is_page_failure(&self) -> bool {
        match self {
            #[cfg(feature = "http-directory")]
            DirectoryError::Http(_) => true,
            #[cfg(feature = "http-directory")]
            DirectoryError::Url(_) => false,
            DirectoryError::Status { .. } | DirectoryError::Unavailable(_) => true,
            DirectoryError::Decode(_) | DirectoryError::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
