use std::fmt::Write;

use crate::{
    ClientContext,
    error::ApiError,
    models::{Article, ArticlePayload},
    navigation::Route,
};

use super::{ViewState, error_message};

const NOT_VERIFIED: &str = "You need to be a verified author to create news";
const NO_PERMISSION: &str = "You do not have permission to edit this news";

/// Title/content/cover fields shared by the create and edit screens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleFields {
    pub title: String,
    pub content: String,
    /// Raw URL input; blank means no cover image.
    pub cover_image: String,
}

impl ArticleFields {
    fn validate(&self) -> Result<ArticlePayload, ApiError> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(ApiError::Validation(
                "Title and content are required".to_string(),
            ));
        }
        Ok(ArticlePayload::from_form(
            &self.title,
            &self.content,
            &self.cover_image,
        ))
    }

    fn render_into(&self, out: &mut String) {
        let _ = writeln!(out, "Title: {}", self.title);
        let _ = writeln!(out, "Content:");
        for line in self.content.lines() {
            let _ = writeln!(out, "  {line}");
        }
        let _ = writeln!(out, "Cover Image URL (optional): {}", self.cover_image);
    }
}

impl From<&Article> for ArticleFields {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone(),
            cover_image: article.cover_image.clone().unwrap_or_default(),
        }
    }
}

/// CreateArticleForm
///
/// Only verified authors (and admins) get past the first check; everyone else
/// is turned away before any request is made.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateArticleForm {
    pub fields: ArticleFields,
    pub error: Option<String>,
}

impl CreateArticleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&mut self, ctx: &ClientContext) -> Result<Article, ApiError> {
        let result = self.try_submit(ctx).await;
        match &result {
            Ok(article) => {
                tracing::info!(news_id = article.id, "news created");
                self.error = None;
                ctx.navigator.navigate(Route::Home);
            }
            Err(e) => {
                if !e.is_validation() {
                    tracing::error!("error creating news: {}", e);
                }
                self.error = Some(error_message(e, "Failed to create news"));
            }
        }
        result
    }

    async fn try_submit(&self, ctx: &ClientContext) -> Result<Article, ApiError> {
        if !ctx.session.is_verified_author() {
            return Err(ApiError::Validation(NOT_VERIFIED.to_string()));
        }
        let payload = self.fields.validate()?;
        ctx.api.create_news(&payload).await
    }

    pub fn render(&self, ctx: &ClientContext) -> String {
        if !ctx.session.is_verified_author() {
            return format!("{NOT_VERIFIED} articles.\n");
        }

        let mut out = String::from("Create New News Article\n=======================\n");
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {error}");
        }
        self.fields.render_into(&mut out);
        out.push_str("[Create News]\n");
        out
    }
}

/// EditArticleForm
///
/// Prefilled from the current article. Refuses to open for users who may not
/// modify it; the backend would reject the update anyway.
#[derive(Debug, Clone, PartialEq)]
pub struct EditArticleForm {
    pub id: i64,
    /// `Ready` once the article is loaded and the user may edit it.
    pub state: ViewState<()>,
    pub fields: ArticleFields,
    pub error: Option<String>,
}

impl EditArticleForm {
    pub async fn load(ctx: &ClientContext, id: i64) -> Self {
        let mut form = Self {
            id,
            state: ViewState::Loading,
            fields: ArticleFields::default(),
            error: None,
        };

        match ctx.api.get_news(id).await {
            Ok(article) if !ctx.session.can_modify(article.author_id) => {
                form.state = ViewState::Failed(NO_PERMISSION.to_string());
            }
            Ok(article) => {
                form.fields = ArticleFields::from(&article);
                form.state = ViewState::Ready(());
            }
            Err(e) => {
                tracing::error!(news_id = id, "error fetching news: {}", e);
                form.state = ViewState::Failed("Failed to load news".to_string());
            }
        }
        form
    }

    pub async fn submit(&mut self, ctx: &ClientContext) -> Result<Article, ApiError> {
        let result = self.try_submit(ctx).await;
        match &result {
            Ok(_) => {
                tracing::info!(news_id = self.id, "news updated");
                self.error = None;
                ctx.navigator.navigate(Route::Article(self.id));
            }
            Err(e) => {
                if !e.is_validation() {
                    tracing::error!(news_id = self.id, "error updating news: {}", e);
                }
                self.error = Some(error_message(e, "Failed to update news"));
            }
        }
        result
    }

    async fn try_submit(&self, ctx: &ClientContext) -> Result<Article, ApiError> {
        if let Some(msg) = self.state.error() {
            return Err(ApiError::Validation(msg.to_string()));
        }
        let payload = self.fields.validate()?;
        ctx.api.update_news(self.id, &payload).await
    }

    /// Leaves the form without saving.
    pub fn cancel(&self, ctx: &ClientContext) {
        ctx.navigator.navigate(Route::Article(self.id));
    }

    pub fn render(&self) -> String {
        match &self.state {
            ViewState::Loading => return "Loading...\n".to_string(),
            ViewState::Failed(msg) => return format!("{msg}\n"),
            ViewState::Ready(()) => {}
        }

        let mut out = String::from("Edit News Article\n=================\n");
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {error}");
        }
        self.fields.render_into(&mut out);
        out.push_str("[Update News] [Cancel]\n");
        out
    }
}
