use sqlx::SqlitePool;

use crate::errors::RequestError;

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct DashboardCounts {
    pub users: i64,
    pub admins: i64,
    pub articles: i64,
    pub published_articles: i64,
    pub tags: i64,
    pub comments: i64,
}

pub async fn dashboard_counts_in_db(pool: &SqlitePool) -> Result<DashboardCounts, RequestError> {
    let result = sqlx::query_as::<_, DashboardCounts>(
        r#"
        SELECT (SELECT COUNT(*) FROM users)                              AS users,
               (SELECT COUNT(*) FROM users WHERE role = 'admin')         AS admins,
               (SELECT COUNT(*) FROM articles)                           AS articles,
               (SELECT COUNT(*) FROM articles WHERE status = 'published') AS published_articles,
               (SELECT COUNT(*) FROM tags)                               AS tags,
               (SELECT COUNT(*) FROM comments)                           AS comments
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(result)
}
