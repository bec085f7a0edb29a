use thiserror::Error;

/// Crate-level error type.
///
/// Persistence failures keep their own taxonomy in [`crate::store::StoreError`],
/// and dispatch failures are classified values ([`crate::dispatch::RunOutcome`]),
/// never errors. This enum covers everything else: configuration, local I/O,
/// and the settings boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status error: {0}")]
    HttpStatus(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
