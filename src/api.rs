use async_trait::async_trait;
use reqwest::Method;

use crate::{
    client::ApiClient,
    error::ApiError,
    models::{Article, ArticlePayload, Comment, CommentPayload, Credentials, Tokens, User},
    session::AuthApi,
};

// --- News ---

impl ApiClient {
    /// GET /news/
    pub async fn list_news(&self) -> Result<Vec<Article>, ApiError> {
        self.send_json(self.request(Method::GET, "/news/")).await
    }

    /// GET /news/{id}
    pub async fn get_news(&self, id: i64) -> Result<Article, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/news/{id}")))
            .await
    }

    /// POST /news/ (verified authors)
    pub async fn create_news(&self, payload: &ArticlePayload) -> Result<Article, ApiError> {
        self.send_json(self.request(Method::POST, "/news/").json(payload))
            .await
    }

    /// PUT /news/{id} (owner or admin)
    pub async fn update_news(&self, id: i64, payload: &ArticlePayload) -> Result<Article, ApiError> {
        self.send_json(self.request(Method::PUT, &format!("/news/{id}")).json(payload))
            .await
    }

    /// DELETE /news/{id} (owner or admin)
    pub async fn delete_news(&self, id: i64) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("/news/{id}")))
            .await
    }

    /// GET /news/{id}/comments/
    pub async fn list_comments(&self, news_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/news/{news_id}/comments/")))
            .await
    }
}

// --- Comments ---

impl ApiClient {
    /// POST /news/{id}/comments/ (any authenticated user)
    pub async fn create_comment(
        &self,
        news_id: i64,
        payload: &CommentPayload,
    ) -> Result<Comment, ApiError> {
        self.send_json(
            self.request(Method::POST, &format!("/news/{news_id}/comments/"))
                .json(payload),
        )
        .await
    }

    /// PUT /comments/{id} (owner or admin)
    pub async fn update_comment(
        &self,
        id: i64,
        payload: &CommentPayload,
    ) -> Result<Comment, ApiError> {
        self.send_json(self.request(Method::PUT, &format!("/comments/{id}")).json(payload))
            .await
    }

    /// DELETE /comments/{id} (owner or admin)
    pub async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("/comments/{id}")))
            .await
    }
}

// --- Auth ---

impl ApiClient {
    /// POST /auth/login. Only returns the tokens; `SessionStore::login` stores them.
    pub async fn login(&self, credentials: &Credentials) -> Result<Tokens, ApiError> {
        self.send_json(self.request(Method::POST, "/auth/login").json(credentials))
            .await
    }

    /// POST /auth/logout, authenticated with the refresh token.
    ///
    /// Goes around the hooks: the access token must not be attached, and a
    /// 401 here means the refresh session is already gone, which is fine.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let response = self
            .raw_request(Method::POST, "/auth/logout")
            .bearer_auth(refresh_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// GET /auth/me
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, "/auth/me")).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn current_user(&self) -> Result<User, ApiError> {
        ApiClient::current_user(self).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        ApiClient::logout(self, refresh_token).await
    }
}
