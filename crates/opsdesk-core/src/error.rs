use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("digits is required")]
    MissingDigits,
    #[error("digits must be exactly 4 numbers")]
    InvalidDigits,
}
