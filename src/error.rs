use thiserror::Error;

/// Message surfaced to the view whenever a fetch cycle fails.
pub const FAILED_TO_LOAD: &str = "Failed to load properties";

/// Errors produced by the search flow.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport failure talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A vocabulary label that maps to no known value
    #[error("Unknown {kind} label: '{label}'")]
    UnknownLabel { kind: &'static str, label: String },

    #[error("Invalid budget range: {min} > {max}")]
    InvalidBudget { min: u64, max: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    pub fn unknown_label(kind: &'static str, label: impl Into<String>) -> Self {
        Self::UnknownLabel {
            kind,
            label: label.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
