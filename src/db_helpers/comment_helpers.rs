use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Comment, CommentWithAuthor, PublishStatus},
};

const COMMENT_COLUMNS: &str = "id, content, status, article_id, author_id, created_at";

pub async fn add_comment_to_article_in_db(
    pool: &SqlitePool,
    author_id: i64,
    article_id: i64,
    content: &str,
) -> Result<Comment, RequestError> {
    let query = format!(
        "INSERT INTO comments (content, status, article_id, author_id, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COMMENT_COLUMNS}"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(content)
        .bind(PublishStatus::Published)
        .bind(article_id)
        .bind(author_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
    Ok(result)
}

pub async fn get_comment_in_db(pool: &SqlitePool, id: i64) -> Result<Option<Comment>, RequestError> {
    let query = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn delete_comment_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    Ok(())
}

/// Published comments on an article, oldest first.
pub async fn list_article_comments_in_db(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<CommentWithAuthor>, RequestError> {
    let result = sqlx::query_as::<Sqlite, CommentWithAuthor>(
        r#"
        SELECT comments.id, comments.content, comments.created_at,
               comments.author_id,
               users.nickname   AS author_nickname,
               users.first_name AS author_first_name,
               users.last_name  AS author_last_name,
               users.avatar_url AS author_avatar_url
        FROM comments
        JOIN users ON users.id = comments.author_id
        WHERE comments.article_id = $1 AND comments.status = $2
        ORDER BY comments.created_at ASC, comments.id ASC
        "#,
    )
    .bind(article_id)
    .bind(PublishStatus::Published)
    .fetch_all(pool)
    .await?;
    Ok(result)
}
