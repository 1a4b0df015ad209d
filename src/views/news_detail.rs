use std::fmt::Write;

use crate::{
    ClientContext,
    error::ApiError,
    models::{Article, Comment},
    navigation::Route,
};

use super::{CommentForm, CommentThread, ViewState, format_datetime};

/// NewsDetail
///
/// One article, its comments, and the comment box (or a login prompt).
#[derive(Debug, Clone, PartialEq)]
pub struct NewsDetail {
    pub id: i64,
    pub state: ViewState<Article>,
    pub comments: CommentThread,
    pub form: CommentForm,
}

impl NewsDetail {
    pub async fn load(ctx: &ClientContext, id: i64) -> Self {
        Self {
            id,
            state: fetch_article(ctx, id).await,
            comments: CommentThread::load(ctx, id).await,
            form: CommentForm::new(id),
        }
    }

    /// Refetches the article, keeping the comment thread as it is.
    pub async fn refresh(&mut self, ctx: &ClientContext) {
        self.state = fetch_article(ctx, self.id).await;
    }

    pub fn article(&self) -> Option<&Article> {
        self.state.ready()
    }

    /// Edit and delete are offered to the author and to admins.
    pub fn can_edit(&self, ctx: &ClientContext) -> bool {
        self.article()
            .is_some_and(|a| ctx.session.can_modify(a.author_id))
    }

    /// Deletes the article and goes back to the list.
    pub async fn delete(&self, ctx: &ClientContext) -> Result<(), ApiError> {
        match ctx.api.delete_news(self.id).await {
            Ok(()) => {
                ctx.navigator.navigate(Route::Home);
                Ok(())
            }
            Err(e) => {
                tracing::error!(news_id = self.id, "error deleting news: {}", e);
                Err(e)
            }
        }
    }

    /// Opens the edit screen for this article.
    pub fn edit(&self, ctx: &ClientContext) {
        ctx.navigator.navigate(Route::EditArticle(self.id));
    }

    /// Posts the comment box content and appends the result to the thread.
    /// Nothing is sent unless the article itself loaded.
    pub async fn post_comment(&mut self, ctx: &ClientContext) -> Result<Comment, ApiError> {
        if let Some(msg) = self.state.error() {
            return Err(ApiError::Validation(msg.to_string()));
        }
        let comment = self.form.submit(ctx).await?;
        self.comments.append(comment.clone());
        Ok(comment)
    }

    pub fn render(&self, ctx: &ClientContext) -> String {
        let article = match &self.state {
            ViewState::Loading => return "Loading news...\n".to_string(),
            ViewState::Failed(msg) => return format!("{msg}\n"),
            ViewState::Ready(article) => article,
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", article.title);
        let _ = writeln!(out, "{}", "=".repeat(article.title.chars().count().max(1)));
        let _ = writeln!(
            out,
            "Published: {} • Author ID: {}",
            format_datetime(&article.publication_date),
            article.author_id
        );
        if self.can_edit(ctx) {
            let _ = writeln!(out, "[Edit] [Delete]");
        }
        if let Some(cover) = &article.cover_image {
            let _ = writeln!(out, "Cover image: {cover}");
        }

        out.push('\n');
        for paragraph in article.paragraphs() {
            let _ = writeln!(out, "{paragraph}");
        }

        out.push_str("\nComments\n--------\n");
        out.push_str(&self.comments.render(&ctx.session));
        out.push('\n');
        if ctx.session.is_authenticated() {
            out.push_str(&self.form.render());
        } else {
            out.push_str("Please login to leave a comment\n");
        }
        out
    }
}

async fn fetch_article(ctx: &ClientContext, id: i64) -> ViewState<Article> {
    match ctx.api.get_news(id).await {
        Ok(article) => ViewState::Ready(article),
        Err(ApiError::NotFound) => ViewState::Failed("News not found".to_string()),
        Err(e) => {
            tracing::error!(news_id = id, "error fetching news: {}", e);
            ViewState::Failed("Failed to load news".to_string())
        }
    }
}
