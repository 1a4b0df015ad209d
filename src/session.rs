use async_trait::async_trait;
use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    error::ApiError,
    models::{Tokens, User},
    storage::TokenStoreState,
};

/// AuthApi
///
/// The two backend calls the session needs. Implemented by `ApiClient`; tests
/// plug in doubles to drive `initialize`/`login`/`logout` without a server.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /auth/me` using whatever access token is currently stored.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// `POST /auth/logout` with the refresh token as bearer.
    async fn logout(&self, refresh_token: &str) -> Result<(), ApiError>;
}

/// SessionStore
///
/// Single source of truth for who is logged in and what they may do. One
/// instance per client, shared through `ClientContext` as `SessionState`.
///
/// Invariant: whenever the user fetch fails the tokens are discarded, so a
/// stored token without a profile only exists while a fetch is in flight.
pub struct SessionStore {
    tokens: TokenStoreState,
    user: RwLock<Option<User>>,
    ready: AtomicBool,
}

pub type SessionState = Arc<SessionStore>;

impl SessionStore {
    pub fn new(tokens: TokenStoreState) -> Self {
        Self {
            tokens,
            user: RwLock::new(None),
            ready: AtomicBool::new(false),
        }
    }

    // --- Lifecycle ---

    /// initialize
    ///
    /// Restores the session at startup. With a persisted access token the
    /// profile is fetched; any failure means "logged out" and the tokens go.
    /// Nothing is surfaced to the user. A second call is a no-op.
    pub async fn initialize(&self, auth: &dyn AuthApi) {
        if self.is_ready() {
            return;
        }

        if self.access_token().is_some() {
            match auth.current_user().await {
                Ok(user) => {
                    tracing::info!(user_id = user.id, "session restored");
                    self.set_user(Some(user));
                }
                Err(e) => {
                    tracing::warn!("stored session rejected, continuing logged out: {}", e);
                    self.discard();
                }
            }
        }

        self.ready.store(true, Ordering::Release);
    }

    /// login
    ///
    /// Persists both tokens, then fetches the profile. The caller is not
    /// authenticated until this returns `Ok`. On a failed fetch the freshly
    /// stored tokens are discarded again and the error is returned.
    pub async fn login(&self, auth: &dyn AuthApi, tokens: Tokens) -> Result<User, ApiError> {
        self.tokens.save(&tokens)?;
        self.set_user(None);

        match auth.current_user().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, email = %user.email, "logged in");
                self.set_user(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!("profile fetch after login failed, dropping tokens: {}", e);
                self.discard();
                Err(e)
            }
        }
    }

    /// logout
    ///
    /// Tells the backend (best effort) and then clears tokens and profile no
    /// matter what the backend said.
    pub async fn logout(&self, auth: &dyn AuthApi) {
        if let Some(refresh) = self.refresh_token() {
            if let Err(e) = auth.logout(&refresh).await {
                tracing::warn!("logout notification failed, clearing session anyway: {}", e);
            }
        }
        self.discard();
        tracing::info!("logged out");
    }

    /// expire
    ///
    /// Tears the session down after the backend rejected the credentials.
    /// Returns `true` only for the call that actually removed something, so a
    /// burst of 401s clears the session once.
    pub fn expire(&self) -> bool {
        // The write guard serializes concurrent teardowns.
        let mut user = self.user.write().unwrap_or_else(PoisonError::into_inner);
        let had_user = user.take().is_some();
        let had_tokens = match self.tokens.clear() {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!("failed to clear expired tokens: {}", e);
                false
            }
        };
        had_user || had_tokens
    }

    // --- Queries ---

    pub fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.with_user(|user| user.is_some())
    }

    pub fn is_admin(&self) -> bool {
        self.with_user(|user| user.is_some_and(|u| u.is_admin))
    }

    pub fn is_verified_author(&self) -> bool {
        self.with_user(|user| user.is_some_and(User::is_verified_author))
    }

    /// Edit/delete affordances: admins everywhere, everyone else on their own work.
    pub fn can_modify(&self, author_id: i64) -> bool {
        self.with_user(|user| user.is_some_and(|u| u.can_modify(author_id)))
    }

    /// Whether `initialize` has finished. Views render nothing before that.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.load().map(|t| t.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.load().map(|t| t.refresh_token)
    }

    // --- Internals ---

    fn with_user<R>(&self, f: impl FnOnce(Option<&User>) -> R) -> R {
        let guard = self.user.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    fn discard(&self) {
        self.expire();
    }
}
