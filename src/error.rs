use crate::config::GrabConfigError;
use crate::status::DownloadStatus;
use std::io;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrabError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error for entry {0}: {1}")]
    Network(u32, String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Entry {0} not found")]
    EntryNotFound(u32),

    #[error("Entry {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: u32,
        from: DownloadStatus,
        to: DownloadStatus,
    },

    #[error("Entry {0} is not downloading (status: {1})")]
    NotDownloading(u32, DownloadStatus),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl GrabError {
    /// Empty-URL rejection raised by both the store and the form.
    pub fn url_required() -> Self {
        GrabError::Validation("URL required".into())
    }
}

impl From<io::Error> for GrabError {
    fn from(err: io::Error) -> Self {
        GrabError::Io(err.to_string())
    }
}

impl From<GrabConfigError> for GrabError {
    fn from(err: GrabConfigError) -> Self {
        GrabError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for GrabError {
    fn from(err: toml::de::Error) -> Self {
        GrabError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for GrabError {
    fn from(err: serde_json::Error) -> Self {
        GrabError::Parse(err.to_string())
    }
}

impl From<ParseIntError> for GrabError {
    fn from(err: ParseIntError) -> Self {
        GrabError::Parse(err.to_string())
    }
}
