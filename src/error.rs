use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// ApiError
///
/// Every failure a view can run into, from local validation to transport errors.
/// None of them is fatal; views turn them into a message and let the user retry.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected locally, before any request was made.
    #[error("{0}")]
    Validation(String),

    /// 401, with the backend's explanation when it sent one. By the time the
    /// caller sees this the session is already torn down.
    #[error("unauthorized{}", detail_suffix(.0))]
    Unauthorized(Option<String>),

    /// 403 with the backend's explanation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404.
    #[error("not found")]
    NotFound,

    /// Any other non-success status.
    #[error("server returned {status}{}", detail_suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// Connection refused, timeout, TLS failure and the like.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The token store could not persist or remove the session.
    #[error("session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Maps a failed response status plus its raw body into the taxonomy.
    ///
    /// FastAPI-style bodies (`{"detail": "..."}`) contribute their message.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
            StatusCode::FORBIDDEN => {
                ApiError::Forbidden(detail.unwrap_or_else(|| "not allowed".to_string()))
            }
            StatusCode::NOT_FOUND => ApiError::NotFound,
            _ => ApiError::Status { status, detail },
        }
    }

    /// The message the backend (or the validator) attached, if any.
    ///
    /// Views prefer this over their own generic fallback text.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Validation(msg) | ApiError::Forbidden(msg) => Some(msg),
            ApiError::Unauthorized(detail) | ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True for errors that never left the client.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default()
}

fn extract_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("detail")? {
        Value::String(msg) => Some(msg.clone()),
        // Pydantic validation errors come as a list of {loc, msg, type}.
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}
