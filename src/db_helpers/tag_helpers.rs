use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use crate::{
    errors::RequestError,
    models::{PublishStatus, Tag, TagWithCount},
};

pub const DEFAULT_TAG_COLOR: &str = "#6B7280";

const TAG_COLUMNS: &str = "id, name, color, status, created_at, updated_at";

fn duplicate_tag(e: RequestError) -> RequestError {
    if e.is_unique_violation() {
        RequestError::Conflict("A tag with this name already exists".to_string())
    } else {
        e
    }
}

/// Exact, case-sensitive lookup by name, creating a published tag with the
/// default color when none exists. Runs on the caller's connection so it can
/// take part in an open transaction. A tag created concurrently under the
/// same name is reused instead of failing the unique constraint.
pub async fn find_or_create_tag(conn: &mut SqliteConnection, name: &str) -> Result<i64, RequestError> {
    let now = Utc::now();
    let inserted = sqlx::query(
        "INSERT INTO tags (name, color, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(name)
    .bind(DEFAULT_TAG_COLOR)
    .bind(PublishStatus::Published)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM tags WHERE name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    if inserted.rows_affected() > 0 {
        tracing::debug!(tag = name, id, "Created tag");
    }
    Ok(id)
}

pub async fn list_published_tags_in_db(pool: &SqlitePool) -> Result<Vec<Tag>, RequestError> {
    let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE status = $1 ORDER BY name");
    let result = sqlx::query_as::<Sqlite, Tag>(&query)
        .bind(PublishStatus::Published)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn list_tags_with_counts_in_db(pool: &SqlitePool) -> Result<Vec<TagWithCount>, RequestError> {
    let result = sqlx::query_as::<Sqlite, TagWithCount>(
        r#"
        SELECT tags.id, tags.name, tags.color, tags.status, tags.created_at,
               (SELECT COUNT(*) FROM article_tags WHERE article_tags.tag_id = tags.id) AS article_count
        FROM tags
        ORDER BY tags.name
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(result)
}

pub async fn get_tag_in_db(pool: &SqlitePool, id: i64) -> Result<Option<Tag>, RequestError> {
    let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, Tag>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn create_tag_in_db(
    pool: &SqlitePool,
    name: &str,
    color: &str,
    status: PublishStatus,
) -> Result<Tag, RequestError> {
    let query = format!(
        "INSERT INTO tags (name, color, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING {TAG_COLUMNS}"
    );
    sqlx::query_as::<Sqlite, Tag>(&query)
        .bind(name)
        .bind(color)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| duplicate_tag(e.into()))
}

pub async fn update_tag_in_db(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    color: &str,
    status: PublishStatus,
) -> Result<Tag, RequestError> {
    let query = format!(
        "UPDATE tags SET name = $1, color = $2, status = $3, updated_at = $4
         WHERE id = $5
         RETURNING {TAG_COLUMNS}"
    );
    sqlx::query_as::<Sqlite, Tag>(&query)
        .bind(name)
        .bind(color)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| duplicate_tag(e.into()))?
        .ok_or(RequestError::NotFound("Tag not found"))
}

/// Removes the tag; its article links cascade.
pub async fn delete_tag_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Tag not found"));
    }
    Ok(())
}
