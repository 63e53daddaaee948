//! Configuration types.
//!
//! Everything is read from the environment; there is no config file.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL every request path is appended to.
    pub base_url: Url,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            request_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// Build from a base URL string with the default timeout.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("FITNESS_AGENT_BACKEND_URL", base_url)?,
            ..Self::default()
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = match std::env::var("FITNESS_AGENT_BACKEND_URL") {
            Ok(raw) => parse_url("FITNESS_AGENT_BACKEND_URL", &raw)?,
            Err(_) => Self::default().base_url,
        };
        Ok(Self {
            base_url,
            request_timeout: request_timeout_from_env()?,
        })
    }
}

/// Auth provider (Supabase) configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub url: Url,
    pub anon_key: SecretString,
    /// Per-request timeout, shared with the backend client.
    pub request_timeout: Duration,
}

impl AuthConfig {
    /// Returns `MissingEnvVar` when either variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("SUPABASE_URL".into()))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("SUPABASE_ANON_KEY".into()))?;

        Ok(Self {
            url: parse_url("SUPABASE_URL", &url)?,
            anon_key: SecretString::from(anon_key),
            request_timeout: request_timeout_from_env()?,
        })
    }
}

/// `FITNESS_AGENT_HTTP_TIMEOUT_SECS`, defaulting to 30 seconds.
fn request_timeout_from_env() -> Result<Duration, ConfigError> {
    let secs = env_parse("FITNESS_AGENT_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT.as_secs())?;
    Ok(Duration::from_secs(secs))
}

/// Task-generation poll budget.
pub fn poll_policy_from_env() -> Result<RetryPolicy, ConfigError> {
    let defaults = RetryPolicy::default();
    let max_attempts = env_parse("FITNESS_AGENT_TASK_POLL_ATTEMPTS", defaults.max_attempts)?;
    let interval_ms = env_parse(
        "FITNESS_AGENT_TASK_POLL_INTERVAL_MS",
        defaults.interval.as_millis() as u64,
    )?;

    Ok(RetryPolicy::new(max_attempts, Duration::from_millis(interval_ms)))
}

/// Location of the persisted session file.
///
/// `FITNESS_AGENT_SESSION_FILE` wins; otherwise `<config dir>/fitness-agent/session.json`.
pub fn session_file_from_env() -> Option<PathBuf> {
    std::env::var("FITNESS_AGENT_SESSION_FILE")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("fitness-agent").join("session.json")))
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
        Err(_) => Ok(default),
    }
}
