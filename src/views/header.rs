use std::fmt::Write;

use crate::{ClientContext, navigation::Route, session::SessionStore};

/// Header
///
/// Site navigation bar. Derived from the session each time it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub greeting: Option<String>,
    pub show_create: bool,
    pub show_login: bool,
    pub show_logout: bool,
}

impl Header {
    pub fn from_session(session: &SessionStore) -> Self {
        match session.current_user() {
            Some(user) => {
                let role = if user.is_admin {
                    " (Admin)"
                } else if user.is_verified_author {
                    " (Author)"
                } else {
                    ""
                };
                Self {
                    greeting: Some(format!("Welcome, {}{}", user.email, role)),
                    show_create: user.is_verified_author(),
                    show_login: false,
                    show_logout: true,
                }
            }
            None => Self {
                greeting: None,
                show_create: false,
                show_login: true,
                show_logout: false,
            },
        }
    }

    pub fn render(&self) -> String {
        let mut links = vec!["[News Service]".to_string()];
        if self.show_create {
            links.push("[Create News]".to_string());
        }
        if let Some(greeting) = &self.greeting {
            links.push(greeting.clone());
        }
        if self.show_logout {
            links.push("[Logout]".to_string());
        }
        if self.show_login {
            links.push("[Login]".to_string());
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", links.join("  "));
        out
    }
}

/// Logout button: backend notification (failure ignored), local teardown, home.
pub async fn logout(ctx: &ClientContext) {
    ctx.session.logout(&ctx.api).await;
    ctx.navigator.navigate(Route::Home);
}
