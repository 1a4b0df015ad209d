use std::sync::Arc;

// --- Module Structure ---

// Core client services.
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod session;
pub mod storage;

// Screens rendered by the front end.
pub mod views;

// --- Public Re-exports ---

pub use client::ApiClient;
pub use config::{ClientConfig, Env};
pub use error::ApiError;
pub use navigation::{Navigator, NavigatorState, Route};
pub use session::{AuthApi, SessionState, SessionStore};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreState};

/// ClientContext
///
/// Everything a view needs, passed explicitly instead of living in globals:
/// the configuration, the one `SessionStore` of this client, the navigator,
/// and the HTTP adapter wired to both.
#[derive(Clone)]
pub struct ClientContext {
    pub config: ClientConfig,
    pub session: SessionState,
    pub navigator: NavigatorState,
    pub api: ApiClient,
}

impl ClientContext {
    /// Wires the session, navigator and adapter together around `tokens`.
    pub fn new(config: ClientConfig, tokens: TokenStoreState) -> Result<Self, ApiError> {
        let session: SessionState = Arc::new(SessionStore::new(tokens));
        let navigator: NavigatorState = Arc::new(Navigator::new());
        let api = ApiClient::new(&config, session.clone(), navigator.clone())?;

        Ok(Self {
            config,
            session,
            navigator,
            api,
        })
    }

    /// Context with a process-scoped token store.
    pub fn in_memory(config: ClientConfig) -> Result<Self, ApiError> {
        Self::new(config, Arc::new(MemoryTokenStore::new()))
    }

    /// Restores the session. Must complete before anything is rendered.
    pub async fn initialize(&self) {
        self.session.initialize(&self.api).await;
    }

    /// True once `initialize` has run; views return an empty render before that.
    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }
}
