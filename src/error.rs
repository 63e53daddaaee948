//! Error types for the fitness agent client.

use reqwest::StatusCode;

use crate::auth::AuthFailure;

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Backend REST errors.
///
/// Every variant renders a message fit for display. `Status` carries the
/// raw response body so server-side detail reaches the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not signed in: no access token available")]
    MissingToken,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Auth provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Failure(#[from] AuthFailure),

    #[error("No session to refresh")]
    NoRefreshToken,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Session persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No config directory available for the session file")]
    NoConfigDir,
}

/// Rejected form input, from the onboarding and goal screens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("{field}: '{value}' is not one of {choices}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        choices: String,
    },

    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;
