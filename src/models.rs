use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Core Schemas (as returned by the backend) ---

/// User
///
/// The authenticated user's profile as returned by `GET /auth/me`.
/// Only `id` and the two role flags drive behavior; the rest is display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, with = "backend_datetime::option")]
    pub registration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_verified_author: bool,
}

impl User {
    /// Admins implicitly qualify as verified authors.
    pub fn is_verified_author(&self) -> bool {
        self.is_admin || self.is_verified_author
    }

    /// Whether this user may edit or delete a resource written by `author_id`.
    pub fn can_modify(&self, author_id: i64) -> bool {
        self.is_admin || self.id == author_id
    }
}

/// Article
///
/// A news item (`/news/{id}`). `content` holds newline-delimited paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub author_id: i64,
    #[serde(with = "backend_datetime")]
    pub publication_date: DateTime<Utc>,
}

impl Article {
    /// Splits the body into paragraphs, one per line, as the detail view shows them.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

/// Comment
///
/// A reader comment attached to an article through `news_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub news_id: i64,
    #[serde(with = "backend_datetime")]
    pub publication_date: DateTime<Utc>,
}

/// Tokens
///
/// Body of a successful `POST /auth/login`. Both tokens are opaque to the client.
#[derive(Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Tokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: None,
        }
    }
}

// Tokens end up in debug logs through the session; never print them.
impl std::fmt::Debug for Tokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

// --- Request Payloads ---

/// Credentials
///
/// Input payload for `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// ArticlePayload
///
/// Body of `POST /news/` and `PUT /news/{id}`. The backend replaces the whole
/// article on update, so there is no partial variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ArticlePayload {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl ArticlePayload {
    /// Builds a payload from raw form input. A blank cover image URL means "none".
    pub fn from_form(title: &str, content: &str, cover_image: &str) -> Self {
        let cover_image = cover_image.trim();
        Self {
            title: title.to_string(),
            content: content.to_string(),
            cover_image: (!cover_image.is_empty()).then(|| cover_image.to_string()),
        }
    }
}

/// CommentPayload
///
/// Body of `POST /news/{id}/comments/` and `PUT /comments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CommentPayload {
    pub text: String,
}

/// Timestamps from the backend are usually naive (`2024-05-01T10:00:00.123456`)
/// and meant as UTC; RFC 3339 with an offset is accepted as well.
pub mod backend_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
                None => Ok(None),
            }
        }
    }
}
