use std::{env, path::PathBuf, time::Duration};

/// Backend address used when `NEWS_API_URL` is not set (local development only).
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// ClientConfig
///
/// Holds the client's entire configuration state. Loaded once at startup and
/// shared read-only through the `ClientContext`; nothing mutates it afterwards.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    // Base URL of the news REST backend, without a trailing slash.
    pub api_url: String,
    // Where the terminal front end persists the session tokens between runs.
    pub session_file: PathBuf,
    // Upper bound for a single request, connect time included.
    pub http_timeout: Duration,
    // Runtime environment marker. Selects the log format and the fail-fast rules.
    pub env: Env,
}

/// Env
///
/// Runtime context. `Local` talks to a backend on localhost and prints
/// human-readable logs; `Production` requires an explicit backend URL and logs JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for ClientConfig {
    /// Non-panicking configuration for tests; no environment variables involved.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: PathBuf::from(".news-session.json"),
            http_timeout: Duration::from_secs(10),
            env: Env::Local,
        }
    }
}

impl ClientConfig {
    /// Convenience for tests and embedding: defaults pointed at another backend.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_url(api_url.into()),
            ..Self::default()
        }
    }

    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first).
    ///
    /// # Panics
    /// Panics in `Env::Production` when `NEWS_API_URL` is missing. Local runs fall
    /// back to `DEFAULT_API_URL`.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_url = match env {
            Env::Production => env::var("NEWS_API_URL")
                .expect("FATAL: NEWS_API_URL must be set in production."),
            Env::Local => env::var("NEWS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };

        let session_file = env::var("NEWS_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        let http_timeout = env::var("NEWS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(10));

        Self {
            api_url: normalize_url(api_url),
            session_file,
            http_timeout,
            env,
        }
    }
}

fn normalize_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// $HOME/.news-session.json, or the working directory when HOME is unset.
fn default_session_file() -> PathBuf {
    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".news-session.json"))
        .unwrap_or_else(|_| PathBuf::from(".news-session.json"))
}
