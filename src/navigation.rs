use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

/// Route
///
/// Every screen the client can show. Paths follow the site's URL scheme so a
/// route can be rendered from (and turned back into) a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    /// `/` — the article list.
    #[default]
    Home,
    /// `/news/{id}` — one article with its comments.
    Article(i64),
    /// `/news/{id}/edit`
    EditArticle(i64),
    /// `/news/create`
    CreateArticle,
    /// `/login`
    Login,
}

impl Route {
    /// Resolves a path. Unknown paths fall back to `Home`, mirroring the
    /// site's catch-all redirect.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["news", "create"] => Route::CreateArticle,
            ["news", id] => id.parse().map(Route::Article).unwrap_or_default(),
            ["news", id, "edit"] => id.parse().map(Route::EditArticle).unwrap_or_default(),
            _ => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Article(id) => format!("/news/{id}"),
            Route::EditArticle(id) => format!("/news/{id}/edit"),
            Route::CreateArticle => "/news/create".to_string(),
            Route::Login => "/login".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Default)]
struct NavState {
    current: Route,
    // Where to go once the user has logged in again.
    return_to: Option<Route>,
}

/// Navigator
///
/// Holds the route the client is on. Views and the HTTP adapter move it; the
/// front end reads it to decide what to render next.
#[derive(Debug, Default)]
pub struct Navigator {
    state: Mutex<NavState>,
}

/// NavigatorState
///
/// Shared handle used by the adapter (forced redirects) and the views.
pub type NavigatorState = Arc<Navigator>;

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(route: Route) -> Self {
        Self {
            state: Mutex::new(NavState {
                current: route,
                return_to: None,
            }),
        }
    }

    pub fn current(&self) -> Route {
        self.lock().current
    }

    pub fn navigate(&self, route: Route) {
        tracing::debug!(to = %route, "navigate");
        self.lock().current = route;
    }

    /// Forces the login screen, remembering the route the user was on.
    pub fn redirect_to_login(&self) {
        let mut state = self.lock();
        if state.current != Route::Login {
            state.return_to = Some(state.current);
        }
        state.current = Route::Login;
        tracing::debug!(return_to = ?state.return_to, "redirected to login");
    }

    /// The route to resume after a successful login; `Home` when there is none.
    pub fn take_return_route(&self) -> Route {
        self.lock().return_to.take().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
