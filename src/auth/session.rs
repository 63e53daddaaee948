//! Session holder: owns the current session and republishes changes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use tokio::sync::{RwLock, watch};
use tracing::{info, warn};

use super::{AuthFailure, AuthNotice, AuthProvider, NoticeClass, Session, TokenSource};
use crate::error::AuthError;

const EMAIL_NOT_CONFIRMED_INFO: &str =
    "Email not confirmed. Please check your inbox and spam for the verification email, then sign in.";
const ACCOUNT_CREATED_INFO: &str =
    "Account created. If email confirmation is required, check your inbox, then sign in.";
const ACCOUNT_EXISTS_INFO: &str = "Account already exists. Please sign in.";

/// Holds the authenticated session for the rest of the client.
///
/// - `subscribe()` yields a `watch` receiver that sees every sign-in,
///   sign-out and refresh.
/// - `is_loading()` is true while a provider call is in flight.
/// - `notice()` is the last error or info message for the sign-in screen.
pub struct SessionHolder {
    provider: Arc<dyn AuthProvider>,
    state: watch::Sender<Option<Session>>,
    loading: AtomicBool,
    notice: RwLock<Option<AuthNotice>>,
}

/// Clears the loading flag when the provider call finishes, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionHolder {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            provider,
            state,
            loading: AtomicBool::new(false),
            notice: RwLock::new(None),
        }
    }

    /// Seed the holder with a previously persisted session.
    pub fn restore(&self, session: Session) {
        info!(user_id = %session.user.id, "Restored session");
        self.state.send_replace(Some(session));
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn notice(&self) -> Option<AuthNotice> {
        self.notice.read().await.clone()
    }

    async fn set_notice(&self, notice: Option<AuthNotice>) {
        *self.notice.write().await = notice;
    }

    /// Sign in with email and password. Returns the notice it recorded, if any.
    pub async fn sign_in(&self, email: &str, password: &str) -> Option<AuthNotice> {
        let _loading = LoadingGuard::start(&self.loading);
        self.set_notice(None).await;

        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "Signed in");
                self.state.send_replace(Some(session));
                None
            }
            Err(failure) => {
                let notice = sign_in_notice(&failure);
                warn!(kind = ?failure.kind, "Sign-in failed");
                self.set_notice(Some(notice.clone())).await;
                Some(notice)
            }
        }
    }

    /// Create an account. On success the holder ends signed out so the user
    /// signs in explicitly, whether or not the provider issued a session.
    /// A failed sign-up leaves the current session alone.
    pub async fn sign_up(&self, email: &str, password: &str) -> Option<AuthNotice> {
        let _loading = LoadingGuard::start(&self.loading);
        self.set_notice(None).await;

        let notice = match self.provider.sign_up(email, password).await {
            Ok(outcome) => {
                if let Some(session) = outcome.session {
                    if let Err(e) = self.provider.sign_out(&session).await {
                        warn!(error = %e, "Sign-out after sign-up failed");
                    }
                }
                info!(email, "Account created");
                self.state.send_replace(None);
                AuthNotice::Info(ACCOUNT_CREATED_INFO.to_string())
            }
            Err(failure) => {
                warn!(kind = ?failure.kind, "Sign-up failed");
                sign_up_notice(&failure)
            }
        };

        self.set_notice(Some(notice.clone())).await;
        Some(notice)
    }

    /// Sign out. Provider failures are logged; the local session is always dropped.
    pub async fn sign_out(&self) {
        let _loading = LoadingGuard::start(&self.loading);

        if let Some(session) = self.current() {
            if let Err(e) = self.provider.sign_out(&session).await {
                warn!(error = %e, "Provider sign-out failed; clearing local session anyway");
            }
            info!(user_id = %session.user.id, "Signed out");
        }
        self.state.send_replace(None);
    }

    /// Exchange the current refresh token for a new session.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let refresh_token = self
            .current()
            .and_then(|s| s.refresh_token)
            .ok_or(AuthError::NoRefreshToken)?;

        let _loading = LoadingGuard::start(&self.loading);
        let session = self.provider.refresh(&refresh_token).await?;
        info!(user_id = %session.user.id, "Session refreshed");
        self.state.send_replace(Some(session.clone()));
        Ok(session)
    }
}

impl TokenSource for SessionHolder {
    fn access_token(&self) -> Option<SecretString> {
        self.state.borrow().as_ref().map(|s| s.access_token.clone())
    }

    fn user_id(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|s| s.user.id.clone())
    }
}

fn sign_in_notice(failure: &AuthFailure) -> AuthNotice {
    match failure.kind.notice_class() {
        NoticeClass::SoftInfo => AuthNotice::Info(EMAIL_NOT_CONFIRMED_INFO.to_string()),
        NoticeClass::HardError => AuthNotice::Error(failure.message.clone()),
    }
}

fn sign_up_notice(failure: &AuthFailure) -> AuthNotice {
    match failure.kind.notice_class() {
        NoticeClass::SoftInfo => AuthNotice::Info(ACCOUNT_EXISTS_INFO.to_string()),
        NoticeClass::HardError => AuthNotice::Error(failure.message.clone()),
    }
}
