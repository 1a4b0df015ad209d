#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{TimeZone, Utc};
use news_portal::{
    ClientConfig, ClientContext, MemoryTokenStore, TokenStoreState,
    models::{Article, ArticlePayload, Comment, CommentPayload, Credentials, Tokens, User},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

pub const ADMIN_ID: i64 = 1;
pub const AUTHOR_ID: i64 = 2;
pub const READER_ID: i64 = 3;

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

/// In-memory stand-in for the news backend.
#[derive(Default)]
pub struct BackendState {
    pub users: HashMap<i64, User>,
    pub passwords: HashMap<String, (String, i64)>,
    /// access token -> user id
    pub access: HashMap<String, i64>,
    /// refresh token -> user id
    pub refresh: HashMap<String, i64>,
    pub news: Vec<Article>,
    pub comments: Vec<Comment>,
    pub next_id: i64,
    pub seen: Vec<Seen>,
    /// Forces `/auth/me` to fail with this status.
    pub me_status: Option<StatusCode>,
    /// Forces `/auth/logout` to fail with this status.
    pub logout_status: Option<StatusCode>,
}

#[derive(Clone)]
pub struct Backend(pub Arc<Mutex<BackendState>>);

impl Backend {
    pub fn state(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.0.lock().unwrap()
    }

    /// Requests seen for `method path`, in order.
    pub fn requests(&self, method: &str, path: &str) -> Vec<Seen> {
        self.state()
            .seen
            .iter()
            .filter(|s| s.method == method && s.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.state().seen.len()
    }
}

pub struct TestBackend {
    pub address: String,
    pub backend: Backend,
}

impl TestBackend {
    /// A client context pointed at this backend, optionally with a stored session.
    pub fn context(&self, tokens: Option<Tokens>) -> ClientContext {
        let store: TokenStoreState = Arc::new(match tokens {
            Some(t) => MemoryTokenStore::with_tokens(t),
            None => MemoryTokenStore::new(),
        });
        self.context_with_store(store)
    }

    pub fn context_with_store(&self, store: TokenStoreState) -> ClientContext {
        ClientContext::new(ClientConfig::with_api_url(&self.address), store)
            .expect("client builds")
    }

    /// Logged-in context for one of the seeded users, initialized.
    pub async fn logged_in(&self, user_id: i64) -> ClientContext {
        let ctx = self.context(Some(tokens_for(user_id)));
        ctx.initialize().await;
        assert!(ctx.session.is_authenticated(), "seeded session must be valid");
        ctx
    }
}

pub fn tokens_for(user_id: i64) -> Tokens {
    Tokens::new(format!("access-{user_id}"), format!("refresh-{user_id}"))
}

fn seed() -> BackendState {
    let mut state = BackendState {
        next_id: 100,
        ..Default::default()
    };

    let users = [
        (ADMIN_ID, "admin@news.io", true, false),
        (AUTHOR_ID, "author@news.io", false, true),
        (READER_ID, "reader@news.io", false, false),
    ];
    for (id, email, is_admin, is_verified_author) in users {
        state.users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                name: Some(email.split('@').next().unwrap().to_string()),
                is_admin,
                is_verified_author,
                ..User::default()
            },
        );
        state
            .passwords
            .insert(email.to_string(), ("secret".to_string(), id));
        let tokens = tokens_for(id);
        state.access.insert(tokens.access_token, id);
        state.refresh.insert(tokens.refresh_token, id);
    }

    let date = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    state.news = vec![
        Article {
            id: 3,
            title: "Rust 2024 edition released".into(),
            content: "First paragraph\nSecond paragraph".into(),
            cover_image: Some("https://img.example/rust.png".into()),
            author_id: AUTHOR_ID,
            publication_date: date,
        },
        Article {
            id: 4,
            title: "Site maintenance".into(),
            content: "Down on Sunday".into(),
            cover_image: None,
            author_id: ADMIN_ID,
            publication_date: date,
        },
    ];
    state.comments = vec![
        Comment {
            id: 10,
            text: "Great news".into(),
            author_id: READER_ID,
            news_id: 3,
            publication_date: date,
        },
        Comment {
            id: 11,
            text: "Thanks!".into(),
            author_id: AUTHOR_ID,
            news_id: 3,
            publication_date: date,
        },
    ];
    state
}

/// Starts the mock backend on an ephemeral port.
pub async fn spawn_backend() -> TestBackend {
    let backend = Backend(Arc::new(Mutex::new(seed())));

    let router = Router::new()
        .route("/news/", get(list_news).post(create_news))
        .route("/news/{id}", get(get_news).put(update_news).delete(delete_news))
        .route("/news/{id}/comments/", get(list_comments).post(create_comment))
        .route("/comments/{id}", put(update_comment).delete(delete_comment))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestBackend { address, backend }
}

// --- Middleware & helpers ---

async fn record(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let seen = seen_from(&request);
    backend.state().seen.push(seen);
    next.run(request).await
}

// Owned copy of what the tests assert on; nothing borrows the request past this.
fn seen_from(request: &Request) -> Seen {
    let header_str = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Seen {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: header_str(header::AUTHORIZATION.as_str()),
        request_id: header_str("x-request-id"),
    }
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn current_user(backend: &Backend, headers: &HeaderMap) -> Result<User, Response> {
    let state = backend.state();
    bearer(headers)
        .and_then(|token| state.access.get(&token).copied())
        .and_then(|id| state.users.get(&id).cloned())
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}

// Naive timestamps, the way the backend serializes them.
fn article_json(article: &Article) -> Value {
    json!({
        "id": article.id,
        "title": article.title,
        "content": article.content,
        "cover_image": article.cover_image,
        "author_id": article.author_id,
        "publication_date": article.publication_date.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    })
}

fn comment_json(comment: &Comment) -> Value {
    json!({
        "id": comment.id,
        "text": comment.text,
        "author_id": comment.author_id,
        "news_id": comment.news_id,
        "publication_date": comment.publication_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}

// --- Handlers ---

async fn list_news(State(backend): State<Backend>) -> Json<Value> {
    let state = backend.state();
    Json(Value::Array(state.news.iter().map(article_json).collect()))
}

async fn get_news(State(backend): State<Backend>, Path(id): Path<i64>) -> Response {
    let state = backend.state();
    match state.news.iter().find(|a| a.id == id) {
        Some(article) => Json(article_json(article)).into_response(),
        None => detail(StatusCode::NOT_FOUND, "News not found"),
    }
}

async fn create_news(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(payload): Json<ArticlePayload>,
) -> Response {
    let user = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if !user.is_verified_author() {
        return detail(StatusCode::FORBIDDEN, "Only verified authors can create news");
    }
    let mut state = backend.state();
    state.next_id += 1;
    let article = Article {
        id: state.next_id,
        title: payload.title,
        content: payload.content,
        cover_image: payload.cover_image,
        author_id: user.id,
        publication_date: Utc::now(),
    };
    state.news.push(article.clone());
    Json(article_json(&article)).into_response()
}

async fn update_news(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<ArticlePayload>,
) -> Response {
    let user = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut state = backend.state();
    let Some(article) = state.news.iter_mut().find(|a| a.id == id) else {
        return detail(StatusCode::NOT_FOUND, "News not found");
    };
    if !user.can_modify(article.author_id) {
        return detail(StatusCode::FORBIDDEN, "Not enough permissions");
    }
    article.title = payload.title;
    article.content = payload.content;
    article.cover_image = payload.cover_image;
    Json(article_json(article)).into_response()
}

async fn delete_news(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let user = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut state = backend.state();
    let Some(article) = state.news.iter().find(|a| a.id == id) else {
        return detail(StatusCode::NOT_FOUND, "News not found");
    };
    if !user.can_modify(article.author_id) {
        return detail(StatusCode::FORBIDDEN, "Not enough permissions");
    }
    state.news.retain(|a| a.id != id);
    state.comments.retain(|c| c.news_id != id);
    Json(json!({ "message": "News deleted" })).into_response()
}

async fn list_comments(State(backend): State<Backend>, Path(id): Path<i64>) -> Json<Value> {
    let state = backend.state();
    Json(Value::Array(
        state
            .comments
            .iter()
            .filter(|c| c.news_id == id)
            .map(comment_json)
            .collect(),
    ))
}

async fn create_comment(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(news_id): Path<i64>,
    Json(payload): Json<CommentPayload>,
) -> Response {
    let user = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut state = backend.state();
    state.next_id += 1;
    let comment = Comment {
        id: state.next_id,
        text: payload.text,
        author_id: user.id,
        news_id,
        publication_date: Utc::now(),
    };
    state.comments.push(comment.clone());
    Json(comment_json(&comment)).into_response()
}

async fn update_comment(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<CommentPayload>,
) -> Response {
    let user = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut state = backend.state();
    let Some(comment) = state.comments.iter_mut().find(|c| c.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Comment not found");
    };
    if !user.can_modify(comment.author_id) {
        return detail(StatusCode::FORBIDDEN, "Not enough permissions");
    }
    comment.text = payload.text;
    Json(comment_json(comment)).into_response()
}

async fn delete_comment(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let user = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut state = backend.state();
    let Some(comment) = state.comments.iter().find(|c| c.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Comment not found");
    };
    if !user.can_modify(comment.author_id) {
        return detail(StatusCode::FORBIDDEN, "Not enough permissions");
    }
    state.comments.retain(|c| c.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn login(State(backend): State<Backend>, Json(creds): Json<Credentials>) -> Response {
    let state = backend.state();
    match state.passwords.get(&creds.email) {
        Some((password, id)) if *password == creds.password => {
            let tokens = tokens_for(*id);
            Json(json!({
                "access_token": tokens.access_token,
                "refresh_token": tokens.refresh_token,
                "token_type": "bearer",
            }))
            .into_response()
        }
        _ => detail(StatusCode::UNAUTHORIZED, "Incorrect email or password"),
    }
}

async fn logout(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let state = backend.state();
    if let Some(status) = state.logout_status {
        return detail(status, "logout failed");
    }
    match bearer(&headers).filter(|t| state.refresh.contains_key(t)) {
        Some(_) => Json(json!({ "message": "Successfully logged out" })).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Invalid refresh token"),
    }
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Some(status) = backend.state().me_status {
        return detail(status, "profile unavailable");
    }
    match current_user(&backend, &headers) {
        Ok(user) => Json(user).into_response(),
        Err(resp) => resp,
    }
}
