use std::fmt::Write;

use crate::{ClientContext, error::ApiError, models::Credentials};

use super::error_message;

/// LoginForm
///
/// Email/password form. On success the session is populated and the user is
/// sent back to wherever the login redirect interrupted them.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }

    pub async fn submit(&mut self, ctx: &ClientContext) -> Result<(), ApiError> {
        let result = self.try_submit(ctx).await;
        match &result {
            Ok(()) => self.error = None,
            Err(e) => {
                tracing::error!("login error: {}", e);
                self.error = Some(error_message(e, "Login failed"));
            }
        }
        result
    }

    async fn try_submit(&self, ctx: &ClientContext) -> Result<(), ApiError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        };
        let tokens = ctx.api.login(&credentials).await?;
        ctx.session.login(&ctx.api, tokens).await?;

        let destination = ctx.navigator.take_return_route();
        ctx.navigator.navigate(destination);
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Login\n=====\n");
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {error}");
        }
        let _ = writeln!(out, "Email: {}", self.email);
        let _ = writeln!(out, "Password: {}", "*".repeat(self.password.chars().count()));
        out.push_str("[Login]\n");
        out
    }
}
