use std::fmt::Write;

use crate::{
    ClientContext,
    error::ApiError,
    models::{Comment, CommentPayload},
    session::SessionStore,
};

use super::{ViewState, format_datetime_short};

/// Comment being edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub comment_id: i64,
    pub text: String,
}

/// CommentThread
///
/// The comment list under an article. Mutations update the in-memory list
/// directly (replace on edit, remove on delete, append on post) rather than
/// refetching the whole thread.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub news_id: i64,
    pub state: ViewState<Vec<Comment>>,
    pub editing: Option<EditDraft>,
    /// Last failed action, shown above the list until the next attempt.
    pub notice: Option<String>,
}

impl CommentThread {
    pub async fn load(ctx: &ClientContext, news_id: i64) -> Self {
        let state = match ctx.api.list_comments(news_id).await {
            Ok(comments) => ViewState::Ready(comments),
            Err(e) => {
                tracing::error!(news_id, "error fetching comments: {}", e);
                ViewState::Failed("Failed to load comments".to_string())
            }
        };
        Self {
            news_id,
            state,
            editing: None,
            notice: None,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        self.state.ready().map(Vec::as_slice).unwrap_or_default()
    }

    /// Adds a freshly posted comment at the end of the list.
    pub fn append(&mut self, comment: Comment) {
        if let Some(comments) = self.state.ready_mut() {
            comments.push(comment);
        }
    }

    /// Opens the inline editor for `comment_id`. Returns `false` if no such comment is listed.
    pub fn start_edit(&mut self, comment_id: i64) -> bool {
        let Some(comment) = self.comments().iter().find(|c| c.id == comment_id) else {
            return false;
        };
        self.editing = Some(EditDraft {
            comment_id,
            text: comment.text.clone(),
        });
        true
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.editing.as_mut() {
            draft.text = text.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Sends the open draft and swaps the updated comment into the list.
    pub async fn save_edit(&mut self, ctx: &ClientContext) -> Result<(), ApiError> {
        let Some(draft) = self.editing.clone() else {
            return Err(ApiError::Validation("No comment is being edited".to_string()));
        };

        let payload = CommentPayload { text: draft.text };
        match ctx.api.update_comment(draft.comment_id, &payload).await {
            Ok(updated) => {
                if let Some(comments) = self.state.ready_mut() {
                    if let Some(slot) = comments.iter_mut().find(|c| c.id == draft.comment_id) {
                        *slot = updated;
                    }
                }
                self.notice = None;
                self.cancel_edit();
                Ok(())
            }
            Err(e) => {
                tracing::error!(comment_id = draft.comment_id, "error updating comment: {}", e);
                self.notice = Some("Failed to update comment".to_string());
                Err(e)
            }
        }
    }

    /// Deletes a comment and drops it from the list.
    pub async fn delete(&mut self, ctx: &ClientContext, comment_id: i64) -> Result<(), ApiError> {
        match ctx.api.delete_comment(comment_id).await {
            Ok(()) => {
                if let Some(comments) = self.state.ready_mut() {
                    comments.retain(|c| c.id != comment_id);
                }
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(comment_id, "error deleting comment: {}", e);
                self.notice = Some("Failed to delete comment".to_string());
                Err(e)
            }
        }
    }

    pub fn render(&self, session: &SessionStore) -> String {
        let comments = match &self.state {
            ViewState::Loading => return "Loading comments...\n".to_string(),
            ViewState::Failed(msg) => return format!("{msg}\n"),
            ViewState::Ready(comments) => comments,
        };

        let mut out = String::new();
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "! {notice}");
        }

        for comment in comments {
            if let Some(draft) = self.editing.as_ref().filter(|d| d.comment_id == comment.id) {
                let _ = writeln!(out, "\n[editing comment #{}]", comment.id);
                let _ = writeln!(out, "{}", draft.text);
                let _ = writeln!(out, "[Save] [Cancel]");
                continue;
            }

            let _ = writeln!(out, "\n#{} Author ID: {}", comment.id, comment.author_id);
            let _ = writeln!(
                out,
                "  Published: {}",
                format_datetime_short(&comment.publication_date)
            );
            if session.can_modify(comment.author_id) {
                let _ = writeln!(out, "  [Edit] [Delete]");
            }
            let _ = writeln!(out, "  {}", comment.text);
        }

        if comments.is_empty() {
            out.push_str("No comments yet. Be the first to comment!\n");
        }
        out
    }
}

/// CommentForm
///
/// "Add a Comment" box shown to authenticated readers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentForm {
    pub news_id: i64,
    pub text: String,
    pub error: Option<String>,
}

impl CommentForm {
    pub fn new(news_id: i64) -> Self {
        Self {
            news_id,
            ..Self::default()
        }
    }

    /// Posts the trimmed text. Blank input never reaches the backend.
    /// On success the draft is cleared and the created comment returned.
    pub async fn submit(&mut self, ctx: &ClientContext) -> Result<Comment, ApiError> {
        let text = self.text.trim();
        if text.is_empty() {
            let msg = "Comment text is required";
            self.error = Some(msg.to_string());
            return Err(ApiError::Validation(msg.to_string()));
        }

        self.error = None;
        let payload = CommentPayload {
            text: text.to_string(),
        };
        match ctx.api.create_comment(self.news_id, &payload).await {
            Ok(comment) => {
                self.text.clear();
                Ok(comment)
            }
            Err(e) => {
                tracing::error!(news_id = self.news_id, "error creating comment: {}", e);
                self.error = Some("Failed to create comment".to_string());
                Err(e)
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Add a Comment\n");
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {error}");
        }
        if self.text.is_empty() {
            out.push_str("> Write your comment here...\n");
        } else {
            let _ = writeln!(out, "> {}", self.text);
        }
        out.push_str("[Post Comment]\n");
        out
    }
}
