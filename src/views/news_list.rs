use std::fmt::Write;

use crate::{ClientContext, models::Article};

use super::{ViewState, format_date};

/// NewsList
///
/// Home page: every article the backend returns, newest first as delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsList {
    pub state: ViewState<Vec<Article>>,
}

impl NewsList {
    pub async fn load(ctx: &ClientContext) -> Self {
        let state = match ctx.api.list_news().await {
            Ok(news) => ViewState::Ready(news),
            Err(e) => {
                tracing::error!("error fetching news: {}", e);
                ViewState::Failed(format!("Failed to load news: {e}"))
            }
        };
        Self { state }
    }

    pub fn render(&self) -> String {
        let news = match &self.state {
            ViewState::Loading => return "Loading news...\n".to_string(),
            ViewState::Failed(msg) => return format!("{msg}\n"),
            ViewState::Ready(news) => news,
        };

        let mut out = String::from("Latest News\n===========\n");
        for item in news {
            let title = if item.title.is_empty() {
                "No title"
            } else {
                &item.title
            };
            let _ = writeln!(out, "\n#{} {}", item.id, title);
            let _ = writeln!(out, "  Author ID: {}", item.author_id);
            let _ = writeln!(out, "  Published: {}", format_date(&item.publication_date));
        }
        if news.is_empty() {
            out.push_str("\nNo news available\n");
        }
        out
    }
}
