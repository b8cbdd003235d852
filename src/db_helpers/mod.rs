use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

mod activity_helpers;
mod admin_helpers;
mod article_helpers;
mod bookmark_helpers;
mod comment_helpers;
mod hero_helpers;
mod tag_helpers;
mod user_helpers;

pub use activity_helpers::*;
pub use admin_helpers::*;
pub use article_helpers::*;
pub use bookmark_helpers::*;
pub use comment_helpers::*;
pub use hero_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

// ----------------- Helper Functions -----------------

pub(crate) const USER_COLUMNS: &str = "id, email, password, first_name, last_name, nickname, bio, \
     github_url, avatar_url, role, created_at, updated_at";

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Split a comma separated tag field: trimmed, empties dropped, first
/// occurrence of each name kept.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !tags.iter().any(|existing| existing == name) {
            tags.push(name.to_owned());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_list_is_trimmed_and_deduplicated() {
        assert_eq!(parse_tag_list(" Rust, web ,,Rust, rust "), vec!["Rust", "web", "rust"]);
        assert!(parse_tag_list("").is_empty());
        assert!(parse_tag_list(" , ").is_empty());
    }
}
