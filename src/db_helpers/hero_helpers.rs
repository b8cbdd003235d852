use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::HeroImage};

const HERO_COLUMNS: &str = "id, url, sort_order, is_active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

pub async fn list_hero_images_in_db(
    pool: &SqlitePool,
    active_only: bool,
) -> Result<Vec<HeroImage>, RequestError> {
    let query = format!(
        "SELECT {HERO_COLUMNS} FROM hero_images
         WHERE ($1 = 0 OR is_active = 1)
         ORDER BY sort_order ASC, id ASC"
    );
    let result = sqlx::query_as::<Sqlite, HeroImage>(&query)
        .bind(active_only)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn get_hero_image_in_db(pool: &SqlitePool, id: i64) -> Result<Option<HeroImage>, RequestError> {
    let query = format!("SELECT {HERO_COLUMNS} FROM hero_images WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, HeroImage>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Append an active image after the current last position (0 when empty).
pub async fn create_hero_image_in_db(pool: &SqlitePool, url: &str) -> Result<HeroImage, RequestError> {
    let query = format!(
        "INSERT INTO hero_images (url, sort_order, is_active)
         VALUES ($1, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM hero_images), 1)
         RETURNING {HERO_COLUMNS}"
    );
    let result = sqlx::query_as::<Sqlite, HeroImage>(&query)
        .bind(url)
        .fetch_one(pool)
        .await?;
    Ok(result)
}

pub async fn delete_hero_image_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM hero_images WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Hero image not found"));
    }
    Ok(())
}

pub async fn toggle_hero_image_active_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<HeroImage, RequestError> {
    let query = format!(
        "UPDATE hero_images SET is_active = NOT is_active WHERE id = $1 RETURNING {HERO_COLUMNS}"
    );
    sqlx::query_as::<Sqlite, HeroImage>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(RequestError::NotFound("Hero image not found"))
}

/// Apply a full id -> order mapping. Either every entry is written or, when
/// one id is unknown, none are.
pub async fn reorder_hero_images_in_db(
    pool: &SqlitePool,
    orders: &[(i64, i64)],
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    for &(id, order) in orders {
        let result = sqlx::query("UPDATE hero_images SET sort_order = $1 WHERE id = $2")
            .bind(order)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RequestError::NotFound("Hero image not found"));
        }
    }
    tx.commit().await?;
    Ok(())
}

/// Swap the image's position with its neighbour in `direction`. Moving past
/// either end leaves everything as it is.
pub async fn move_hero_image_in_db(
    pool: &SqlitePool,
    id: i64,
    direction: MoveDirection,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let images = sqlx::query_as::<Sqlite, HeroImage>(&format!(
        "SELECT {HERO_COLUMNS} FROM hero_images ORDER BY sort_order ASC, id ASC"
    ))
    .fetch_all(&mut *tx)
    .await?;

    let index = images
        .iter()
        .position(|image| image.id == id)
        .ok_or(RequestError::NotFound("Hero image not found"))?;
    let neighbour = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => Some(index + 1).filter(|next| *next < images.len()),
    };
    let Some(neighbour) = neighbour else {
        return Ok(());
    };

    let (current, other) = (&images[index], &images[neighbour]);
    for (image_id, order) in [(current.id, other.sort_order), (other.id, current.sort_order)] {
        sqlx::query("UPDATE hero_images SET sort_order = $1 WHERE id = $2")
            .bind(order)
            .bind(image_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
