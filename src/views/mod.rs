//! View Module Index
//!
//! Screens of the news site, rendered as plain text. Each view pulls data
//! through the `ApiClient` in its `ClientContext` and asks the `SessionStore`
//! which actions to offer. Hiding an action is a courtesy only; the backend
//! decides what is actually allowed.

use chrono::{DateTime, Utc};

use crate::{ClientContext, error::ApiError, navigation::Route};

pub mod article_form;
pub mod comments;
pub mod header;
pub mod login_form;
pub mod news_detail;
pub mod news_list;

pub use article_form::{CreateArticleForm, EditArticleForm};
pub use comments::{CommentForm, CommentThread};
pub use header::Header;
pub use login_form::LoginForm;
pub use news_detail::NewsDetail;
pub use news_list::NewsList;

/// Load state shared by every view that fetches something.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState<T> {
    #[default]
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Backend detail when there is one, the view's own wording otherwise.
pub fn error_message(err: &ApiError, fallback: &str) -> String {
    err.detail().map(str::to_string).unwrap_or_else(|| fallback.to_string())
}

/// "May 1, 2024" — article cards.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// "May 1, 2024, 09:30 AM" — article detail.
pub fn format_datetime(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y, %I:%M %p").to_string()
}

/// "May 1, 2024, 09:30 AM" with the abbreviated month — comments.
pub fn format_datetime_short(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Renders whatever `route` points at, the way the front end's router would.
///
/// Returns an empty string until the session has been initialized.
pub async fn render_route(ctx: &ClientContext, route: Route) -> String {
    if !ctx.is_ready() {
        return String::new();
    }

    let header = Header::from_session(&ctx.session).render();
    let body = match route {
        Route::Home => NewsList::load(ctx).await.render(),
        Route::Article(id) => NewsDetail::load(ctx, id).await.render(ctx),
        Route::EditArticle(id) => EditArticleForm::load(ctx, id).await.render(),
        Route::CreateArticle => CreateArticleForm::new().render(ctx),
        Route::Login => LoginForm::default().render(),
    };
    format!("{header}\n{body}")
}
