use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Role, User, UserWithCounts},
};

use super::USER_COLUMNS;

pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
}

/// Profile fields after normalisation: `None` clears the column. The avatar
/// is only replaced when a new one was uploaded.
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn insert_user_in_db(pool: &SqlitePool, user: NewUser) -> Result<User, RequestError> {
    let now = Utc::now();
    let query = format!(
        "INSERT INTO users (email, password, first_name, last_name, nickname, role, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
         RETURNING {USER_COLUMNS}"
    );
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.nickname)
        .bind(Role::General)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(RequestError::from);

    match result {
        Err(e) if e.is_unique_violation() => Err(RequestError::Conflict(
            "A user with this email already exists".to_string(),
        )),
        other => other,
    }
}

pub async fn update_profile_in_db(
    pool: &SqlitePool,
    user_id: i64,
    ProfileUpdate {
        nickname,
        bio,
        github_url,
        avatar_url,
    }: ProfileUpdate,
) -> Result<User, RequestError> {
    let query = format!(
        "UPDATE users
         SET nickname = $1, bio = $2, github_url = $3,
             avatar_url = COALESCE($4, avatar_url), updated_at = $5
         WHERE id = $6
         RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(nickname)
        .bind(bio)
        .bind(github_url)
        .bind(avatar_url)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(RequestError::NotFound("User not found"))
}

/// Set the email and, when given, a new password hash.
pub async fn update_account_in_db(
    pool: &SqlitePool,
    user_id: i64,
    email: String,
    password_hash: Option<String>,
) -> Result<User, RequestError> {
    let query = format!(
        "UPDATE users
         SET email = $1, password = COALESCE($2, password), updated_at = $3
         WHERE id = $4
         RETURNING {USER_COLUMNS}"
    );
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(RequestError::from);

    match result {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(RequestError::NotFound("User not found")),
        Err(e) if e.is_unique_violation() => Err(RequestError::Conflict(
            "This email is already in use".to_string(),
        )),
        Err(e) => Err(e),
    }
}

pub async fn list_users_with_counts_in_db(
    pool: &SqlitePool,
) -> Result<Vec<UserWithCounts>, RequestError> {
    let result = sqlx::query_as::<Sqlite, UserWithCounts>(
        r#"
        SELECT users.id, users.email, users.first_name, users.last_name, users.nickname,
               users.avatar_url, users.role, users.created_at,
               (SELECT COUNT(*) FROM articles WHERE articles.author_id = users.id) AS article_count,
               (SELECT COUNT(*) FROM comments WHERE comments.author_id = users.id) AS comment_count
        FROM users
        ORDER BY users.created_at DESC, users.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(result)
}

pub async fn recent_users_in_db(pool: &SqlitePool, limit: i64) -> Result<Vec<User>, RequestError> {
    let query =
        format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn update_user_role_in_db(
    pool: &SqlitePool,
    user_id: i64,
    role: Role,
) -> Result<User, RequestError> {
    let query = format!(
        "UPDATE users SET role = $1, updated_at = $2 WHERE id = $3 RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(role)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(RequestError::NotFound("User not found"))
}

/// Delete a user with their articles, comments and bookmarks in one
/// transaction. Returns the cover image URLs of the removed articles so the
/// caller can clean up the files.
pub async fn delete_user_in_db(pool: &SqlitePool, user_id: i64) -> Result<Vec<String>, RequestError> {
    let mut tx = pool.begin().await?;

    let covers: Vec<(String,)> = sqlx::query_as(
        "SELECT cover_image_url FROM articles WHERE author_id = $1 AND cover_image_url IS NOT NULL",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM bookmarks WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM comments WHERE author_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    // Tag links, comments and bookmarks on these articles go with them.
    sqlx::query("DELETE FROM articles WHERE author_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    tx.commit().await?;
    Ok(covers.into_iter().map(|(url,)| url).collect())
}
