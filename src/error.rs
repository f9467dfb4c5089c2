// Allow module inception for error types - this is a common Rust pattern
#![allow(clippy::module_name_repetitions)]

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Missing required endpoint: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Generate webhook request failed: {status} {body}")]
    GenerateFailure { status: StatusCode, body: String },

    #[error("Malformed generate response: {0}")]
    MalformedResponse(String),

    #[error("Submission failed: {status} {body}")]
    SubmitFailure { status: StatusCode, body: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SubmitError {
    /// HTTP status carried by the failure, if the server answered at all
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::GenerateFailure { status, .. } | Self::SubmitFailure { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type SubmitResult<T> = Result<T, SubmitError>;
