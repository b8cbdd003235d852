use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::RequestError;

/// Flip the bookmark for (user, article) and return whether it now exists.
///
/// Delete first; only when nothing was removed insert, ignoring a row a
/// concurrent toggle may have added in between.
pub async fn toggle_bookmark_in_db(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<bool, RequestError> {
    let removed = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND article_id = $2")
        .bind(user_id)
        .bind(article_id)
        .execute(pool)
        .await?;
    if removed.rows_affected() > 0 {
        return Ok(false);
    }

    sqlx::query(
        "INSERT OR IGNORE INTO bookmarks (user_id, article_id, created_at) VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(article_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(true)
}

pub async fn is_bookmarked_in_db(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<bool, RequestError> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM bookmarks WHERE user_id = $1 AND article_id = $2)",
    )
    .bind(user_id)
    .bind(article_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}
