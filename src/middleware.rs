use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{session::current_user, AppState};

pub const PROTECTED_PREFIXES: [&str; 3] = ["/mypage", "/post", "/admin"];

/// Where a page request has to be sent instead, if anywhere.
pub fn guard_redirect(path: &str, authenticated: bool) -> Option<&'static str> {
    if !authenticated && PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return Some("/login");
    }
    if authenticated && (path == "/login" || path == "/register") {
        return Some("/mypage");
    }
    None
}

/// Page-level session gate. API and static upload paths are left to their
/// handlers.
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path.starts_with("/api") || path.starts_with("/uploads") {
        return next.run(request).await;
    }

    let authenticated = current_user(request.headers(), &state.tokens).is_some();
    match guard_redirect(path, authenticated) {
        Some(target) => {
            tracing::debug!(path, target, "Redirecting page request");
            Redirect::to(target).into_response()
        }
        None => next.run(request).await,
    }
}
