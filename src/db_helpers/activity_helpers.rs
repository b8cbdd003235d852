use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Activity, ActivityType, TargetType},
};

pub struct NewActivity<'a> {
    pub admin_id: i64,
    pub action_type: ActivityType,
    pub target_type: TargetType,
    pub target_id: i64,
    pub target_name: &'a str,
    pub description: String,
}

pub async fn record_activity_in_db(
    pool: &SqlitePool,
    activity: NewActivity<'_>,
) -> Result<(), RequestError> {
    sqlx::query(
        "INSERT INTO activities (admin_id, action_type, target_type, target_id, target_name, description, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(activity.admin_id)
    .bind(activity.action_type)
    .bind(activity.target_type)
    .bind(activity.target_id)
    .bind(activity.target_name)
    .bind(&activity.description)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    tracing::info!(
        admin_id = activity.admin_id,
        action = ?activity.action_type,
        target_id = activity.target_id,
        "Recorded admin activity"
    );
    Ok(())
}

pub async fn recent_activities_in_db(pool: &SqlitePool, limit: i64) -> Result<Vec<Activity>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Activity>(
        "SELECT id, admin_id, action_type, target_type, target_id, target_name, description, created_at
         FROM activities
         ORDER BY created_at DESC, id DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(result)
}
