use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid value for {option}: {reason}")]
    InvalidArgument { option: &'static str, reason: String },

    #[error("Can't find or read the file ({}): {source}", .path.display())]
    FileNotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Socket error connecting to {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected response from server: {0:?}")]
    UnexpectedResponse(String),

    #[error("Report not found at {url}")]
    ReportNotFound { url: String },

    #[error("Malformed bitmap reference: {0}")]
    MalformedBitmapReference(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn invalid(option: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            option,
            reason: reason.into(),
        }
    }
}
