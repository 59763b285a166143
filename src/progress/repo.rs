use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::repo_types::ProgressEntry;

const COLUMNS: &str = "id, user_id, date, weight, body_fat, muscle_mass, created_at";

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    weight: f64,
    body_fat: Option<f64>,
    muscle_mass: Option<f64>,
) -> Result<ProgressEntry, sqlx::Error> {
    sqlx::query_as::<_, ProgressEntry>(&format!(
        r#"
        INSERT INTO progress_entries (user_id, date, weight, body_fat, muscle_mass)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(date)
    .bind(weight)
    .bind(body_fat)
    .bind(muscle_mass)
    .fetch_one(db)
    .await
}

/// Entries in ascending date order, optionally bounded.
pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    start: Option<Date>,
    end: Option<Date>,
) -> Result<Vec<ProgressEntry>, sqlx::Error> {
    sqlx::query_as::<_, ProgressEntry>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM progress_entries
        WHERE user_id = $1
          AND ($2::date IS NULL OR date >= $2)
          AND ($3::date IS NULL OR date <= $3)
        ORDER BY date
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<ProgressEntry>, sqlx::Error> {
    sqlx::query_as::<_, ProgressEntry>(&format!(
        "SELECT {COLUMNS} FROM progress_entries WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn latest(db: &PgPool, user_id: Uuid) -> Result<Option<ProgressEntry>, sqlx::Error> {
    sqlx::query_as::<_, ProgressEntry>(&format!(
        "SELECT {COLUMNS} FROM progress_entries WHERE user_id = $1 ORDER BY date DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    date: Date,
    weight: f64,
    body_fat: Option<f64>,
    muscle_mass: Option<f64>,
) -> Result<Option<ProgressEntry>, sqlx::Error> {
    sqlx::query_as::<_, ProgressEntry>(&format!(
        r#"
        UPDATE progress_entries
        SET date = $3, weight = $4, body_fat = $5, muscle_mass = $6
        WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(date)
    .bind(weight)
    .bind(body_fat)
    .bind(muscle_mass)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM progress_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
