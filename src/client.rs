use reqwest::{Method, RequestBuilder, Response, StatusCode, header::HeaderValue};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    config::ClientConfig, error::ApiError, navigation::NavigatorState, session::SessionState,
};

/// Header carrying the per-request correlation id, matching the backend's logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ApiClient
///
/// The HTTP adapter every view goes through. It owns the two hooks that keep
/// the session honest:
///
/// 1. Outbound (`authorize`): attach the stored access token as a bearer
///    credential, or nothing when there is none.
/// 2. Inbound (`inspect`): on 401, expire the session, force the login route,
///    and hand `ApiError::Unauthorized` back to the caller. There is no retry
///    and no refresh; an expired session always means logging in again.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionState,
    navigator: NavigatorState,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: SessionState,
        navigator: NavigatorState,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn navigator(&self) -> &NavigatorState {
        &self.navigator
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Starts a request with both hooks armed. Finish it with `send_json`/`send_empty`.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%method, path, req_id = %request_id, "api request");

        let builder = self
            .http
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, request_id);
        self.authorize(builder)
    }

    /// A request that skips the outbound hook: the caller supplies its own bearer.
    pub(crate) fn raw_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
    }

    /// Sends a hooked request and decodes the JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.inspect(builder.send().await?).await?;
        decode_body(response).await
    }

    /// Sends a hooked request whose body (if any) is not needed.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.inspect(builder.send().await?).await.map(|_| ())
    }

    // Outbound hook.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // Inbound hook.
    async fn inspect(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }

        // 401 bodies carry a detail as well.
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &body);
        if status.is_server_error() {
            tracing::error!(%status, "backend failure: {}", err);
        } else {
            tracing::debug!(%status, "request rejected: {}", err);
        }
        Err(err)
    }

    fn handle_unauthorized(&self) {
        if self.session.expire() {
            tracing::warn!("session rejected by backend, logged out");
        }
        self.navigator.redirect_to_login();
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .is_none_or(|ct| ct.contains("json"));
    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| {
        if is_json {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Decode(format!("expected JSON, got: {}", truncate(&body, 80)))
        }
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
