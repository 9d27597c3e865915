use std::path::PathBuf;

use serenity::http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed opt-in file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A request Discord rejected, or one that never reached it.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed (status {status:?}, code {code:?}): {message}")]
pub struct PlatformApiError {
    pub operation: String,
    pub status: Option<u16>,
    pub code: Option<isize>,
    pub message: String,
}

impl PlatformApiError {
    pub fn new(operation: &str, message: impl Into<String>) -> Self {
        Self {
            operation: operation.to_string(),
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn from_serenity(operation: &str, err: serenity::Error) -> Self {
        match err {
            serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => Self {
                operation: operation.to_string(),
                status: Some(response.status_code.as_u16()),
                code: Some(response.error.code),
                message: response.error.message,
            },
            other => Self::new(operation, other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("event {event_id} has neither a location nor a hosting channel")]
    MissingLocation { event_id: u64 },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Translation(#[from] TranslationError),
    #[error(transparent)]
    Platform(#[from] PlatformApiError),
    #[error("failed to write calendar file {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
