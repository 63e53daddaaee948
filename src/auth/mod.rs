//! Authentication: provider abstraction and the session holder.
//!
//! The auth provider is an external collaborator. `AuthProvider` is the seam:
//! implementations turn provider responses into a `Session` or a tagged
//! `AuthFailure`. The `SessionHolder` republishes session state to the rest
//! of the client and hands bearer tokens to the REST client via
//! `TokenSource`.

pub mod session;
pub mod store;
pub mod supabase;

pub use session::SessionHolder;
pub use store::FileSessionStore;
pub use supabase::SupabaseAuth;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

/// The authenticated user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token has passed its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Result of a sign-up. The provider withholds the session when email
/// confirmation is required.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

// ── Failures ────────────────────────────────────────────────────────────

/// What went wrong, as classified by the provider adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    EmailNotConfirmed,
    UserAlreadyExists,
    InvalidCredentials,
    WeakPassword,
    RateLimited,
    Network,
    Provider,
}

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeClass {
    HardError,
    SoftInfo,
}

impl AuthFailureKind {
    pub fn notice_class(&self) -> NoticeClass {
        match self {
            Self::EmailNotConfirmed | Self::UserAlreadyExists => NoticeClass::SoftInfo,
            Self::InvalidCredentials
            | Self::WeakPassword
            | Self::RateLimited
            | Self::Network
            | Self::Provider => NoticeClass::HardError,
        }
    }
}

/// A classified provider failure. `message` is the provider's own text and is
/// only ever displayed, never inspected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub kind: AuthFailureKind,
    pub message: String,
}

impl AuthFailure {
    pub fn new(kind: AuthFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A message for the sign-in screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthNotice {
    Error(String),
    Info(String),
}

impl AuthNotice {
    pub fn text(&self) -> &str {
        match self {
            Self::Error(text) | Self::Info(text) => text,
        }
    }
}

// ── Provider seam ───────────────────────────────────────────────────────

/// An external identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthFailure>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthFailure>;

    /// Revoke the session on the provider side.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthFailure>;

    /// Exchange a refresh token for a fresh session.
    async fn refresh(&self, refresh_token: &SecretString) -> Result<Session, AuthFailure>;
}

// ── Token source ────────────────────────────────────────────────────────

/// Supplies the REST client with credentials at call time.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<SecretString>;

    fn user_id(&self) -> Option<String>;
}

/// A fixed token, for scripts and tests that already hold one.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: SecretString,
    user_id: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user_id: user_id.into(),
        }
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<SecretString> {
        Some(self.token.clone())
    }

    fn user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }
}

/// No credentials at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn access_token(&self) -> Option<SecretString> {
        None
    }

    fn user_id(&self) -> Option<String> {
        None
    }
}
