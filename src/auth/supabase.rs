//! Supabase auth adapter: talks to the provider's REST auth endpoints.
//!
//! Only the four calls the client needs are covered: password sign-in,
//! sign-up, logout and refresh. Provider error codes are classified here so
//! nothing downstream looks at message text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{AuthFailure, AuthFailureKind, AuthProvider, AuthUser, Session, SignUpOutcome};
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Supabase auth client.
pub struct SupabaseAuth {
    base: String,
    anon_key: SecretString,
    client: reqwest::Client,
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Sign-up returns a full session when confirmation is off, a bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

/// Error payload. Newer servers send `error_code`; older ones `error`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.error.as_deref())
    }

    fn display(&self, fallback: &str) -> String {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Map a provider error response onto a failure kind.
fn classify(status: StatusCode, code: Option<&str>) -> AuthFailureKind {
    match code {
        Some("email_not_confirmed") => AuthFailureKind::EmailNotConfirmed,
        Some("user_already_exists" | "email_exists") => AuthFailureKind::UserAlreadyExists,
        Some("invalid_credentials" | "invalid_grant") => AuthFailureKind::InvalidCredentials,
        Some("weak_password") => AuthFailureKind::WeakPassword,
        Some(c) if c.starts_with("over_") && c.ends_with("rate_limit") => AuthFailureKind::RateLimited,
        _ if status == StatusCode::TOO_MANY_REQUESTS => AuthFailureKind::RateLimited,
        _ => AuthFailureKind::Provider,
    }
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });

        Session {
            access_token: SecretString::from(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            expires_at,
            user: self.user.into(),
        }
    }
}

impl From<UserResponse> for AuthUser {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────────

impl SupabaseAuth {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            base: config.url.as_str().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base)
    }

    /// POST a JSON body and return the successful response, or a classified failure.
    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        bearer: Option<&SecretString>,
    ) -> Result<reqwest::Response, AuthFailure> {
        debug!(path, "Auth provider request");

        let mut request = self
            .client
            .post(self.endpoint(path))
            .header("apikey", self.anon_key.expose_secret())
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AuthFailure::new(AuthFailureKind::Network, e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let kind = classify(status, body.code());
        debug!(%status, code = ?body.code(), ?kind, "Auth provider rejected request");

        let fallback = if text.is_empty() {
            format!("auth request failed with status {status}")
        } else {
            text.clone()
        };
        Err(AuthFailure::new(kind, body.display(&fallback)))
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, AuthFailure> {
        resp.json::<T>()
            .await
            .map_err(|e| AuthFailure::new(AuthFailureKind::Provider, format!("unexpected auth response: {e}")))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthFailure> {
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self.post("token?grant_type=password", &body, None).await?;
        let token: TokenResponse = Self::decode(resp).await?;
        Ok(token.into_session())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthFailure> {
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self.post("signup", &body, None).await?;

        Ok(match Self::decode::<SignUpResponse>(resp).await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session();
                SignUpOutcome {
                    user: Some(session.user.clone()),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => SignUpOutcome {
                user: Some(user.into()),
                session: None,
            },
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthFailure> {
        self.post("logout", &serde_json::json!({}), Some(&session.access_token))
            .await
            .map(|_| ())
    }

    async fn refresh(&self, refresh_token: &SecretString) -> Result<Session, AuthFailure> {
        let body = serde_json::json!({ "refresh_token": refresh_token.expose_secret() });
        let resp = self.post("token?grant_type=refresh_token", &body, None).await?;
        let token: TokenResponse = Self::decode(resp).await?;
        Ok(token.into_session())
    }
}
