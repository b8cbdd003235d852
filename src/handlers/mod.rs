use axum::{
    http::{StatusCode, Uri},
    Json,
};

use crate::{db_helpers::get_article_in_db, errors::RequestError, models::Article, AppState};

mod admin_handlers;
mod article_handlers;
mod auth_handlers;
mod comment_handlers;
mod page_handlers;
mod user_handlers;

pub use admin_handlers::*;
pub use article_handlers::*;
pub use auth_handlers::*;
pub use comment_handlers::*;
pub use page_handlers::*;
pub use user_handlers::*;

type JsonResult<T> = Result<Json<T>, RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

fn profile_path(user_id: i64) -> String {
    format!("/profile/{user_id}")
}

fn article_path(article_id: i64) -> String {
    format!("/articles/{article_id}")
}

/// The article, unless it is missing or a draft the viewer did not write.
/// Both cases read as not found.
async fn visible_article(
    state: &AppState,
    article_id: i64,
    viewer_id: Option<i64>,
) -> Result<Article, RequestError> {
    get_article_in_db(&state.pool, article_id)
        .await?
        .filter(|article| article.is_visible_to(viewer_id))
        .ok_or(RequestError::NotFound("Article not found"))
}
