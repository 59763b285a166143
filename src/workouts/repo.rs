use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::dto::ParsedFilter;
use super::repo_types::{WorkoutFeedbackRow, WorkoutLog, WorkoutRow};
use crate::engine::types::{Difficulty, Exercise, Intensity, WorkoutStatus, WorkoutType};

const WORKOUT_COLUMNS: &str = "id, user_id, name, description, workout_type, intensity, difficulty, \
                               duration, exercises, series_reps, frequency, load, focus, \
                               muscle_groups, equipment, status, rating, completed_date, \
                               created_at, updated_at";

pub struct NewWorkout<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub workout_type: WorkoutType,
    pub intensity: Intensity,
    pub difficulty: Difficulty,
    pub duration: i32,
    pub exercises: &'a [Exercise],
    pub series_reps: &'a str,
    pub frequency: &'a str,
    pub load: f64,
    pub focus: &'a str,
    pub muscle_groups: &'a [String],
    pub equipment: &'a [String],
}

pub async fn insert(db: &PgPool, user_id: Uuid, w: NewWorkout<'_>) -> Result<WorkoutRow, sqlx::Error> {
    sqlx::query_as::<_, WorkoutRow>(&format!(
        r#"
        INSERT INTO workouts (
            user_id, name, description, workout_type, intensity, difficulty, duration,
            exercises, series_reps, frequency, load, focus, muscle_groups, equipment, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {WORKOUT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(w.name)
    .bind(w.description)
    .bind(w.workout_type.as_str())
    .bind(w.intensity.as_str())
    .bind(w.difficulty.as_str())
    .bind(w.duration)
    .bind(Json(w.exercises))
    .bind(w.series_reps)
    .bind(w.frequency)
    .bind(w.load)
    .bind(w.focus)
    .bind(w.muscle_groups.to_vec())
    .bind(w.equipment.to_vec())
    .bind(WorkoutStatus::Pending.as_str())
    .fetch_one(db)
    .await
}

pub async fn list(db: &PgPool, user_id: Uuid, f: &ParsedFilter) -> Result<Vec<WorkoutRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE user_id = "));
    qb.push_bind(user_id);
    if let Some(t) = f.workout_type {
        qb.push(" AND workout_type = ").push_bind(t.as_str());
    }
    if let Some(i) = f.intensity {
        qb.push(" AND intensity = ").push_bind(i.as_str());
    }
    if let Some(s) = f.status {
        qb.push(" AND status = ").push_bind(s.as_str());
    }
    if let Some(min) = f.min_load {
        qb.push(" AND load >= ").push_bind(min);
    }
    if let Some(max) = f.max_load {
        qb.push(" AND load <= ").push_bind(max);
    }
    qb.push(" ORDER BY created_at DESC");
    qb.build_query_as::<WorkoutRow>().fetch_all(db).await
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<WorkoutRow>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutRow>(&format!(
        "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Completing a workout stamps `completed_date`; any other status clears it.
pub async fn update_status(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    status: WorkoutStatus,
) -> Result<Option<WorkoutRow>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutRow>(&format!(
        r#"
        UPDATE workouts SET
            status = $3,
            completed_date = CASE WHEN $3 = 'completed' THEN now() ELSE NULL END,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {WORKOUT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(status.as_str())
    .fetch_optional(db)
    .await
}

pub async fn insert_feedback(
    db: &PgPool,
    workout_id: Uuid,
    rating: i32,
    comment: Option<&str>,
) -> Result<WorkoutFeedbackRow, sqlx::Error> {
    sqlx::query_as::<_, WorkoutFeedbackRow>(
        r#"
        INSERT INTO workout_feedback (workout_id, rating, comment)
        VALUES ($1, $2, $3)
        RETURNING id, workout_id, rating, comment, created_at
        "#,
    )
    .bind(workout_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(db)
    .await
}

pub async fn insert_log(
    db: &PgPool,
    workout_id: Uuid,
    rating: i32,
    duration_minutes: Option<i32>,
) -> Result<WorkoutLog, sqlx::Error> {
    sqlx::query_as::<_, WorkoutLog>(
        r#"
        INSERT INTO workout_logs (workout_id, rating, duration_minutes)
        VALUES ($1, $2, $3)
        RETURNING id, workout_id, rating, duration_minutes, created_at
        "#,
    )
    .bind(workout_id)
    .bind(rating)
    .bind(duration_minutes)
    .fetch_one(db)
    .await
}

pub async fn list_logs(db: &PgPool, workout_id: Uuid) -> Result<Vec<WorkoutLog>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutLog>(
        r#"
        SELECT id, workout_id, rating, duration_minutes, created_at
        FROM workout_logs
        WHERE workout_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(workout_id)
    .fetch_all(db)
    .await
}

/// Stores adjusted load and intensity and refreshes the average rating.
pub async fn apply_feedback(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    load: f64,
    intensity: Intensity,
) -> Result<Option<WorkoutRow>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutRow>(&format!(
        r#"
        UPDATE workouts SET
            load = $3,
            intensity = $4,
            rating = (SELECT AVG(rating)::float8 FROM workout_feedback WHERE workout_id = $1),
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {WORKOUT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(load)
    .bind(intensity.as_str())
    .fetch_optional(db)
    .await
}

/// Loads of the user's most recent workouts whose focus mentions any of `terms`.
pub async fn recent_loads(
    db: &PgPool,
    user_id: Uuid,
    terms: &[&str],
    limit: i64,
) -> Result<Vec<f64>, sqlx::Error> {
    let patterns: Vec<String> = terms.iter().map(|t| format!("%{t}%")).collect();
    sqlx::query_scalar::<_, f64>(
        r#"
        SELECT load FROM workouts
        WHERE user_id = $1 AND focus ILIKE ANY($2)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(patterns)
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Most recent workout whose focus or name mentions any of `terms`.
pub async fn latest_matching(
    db: &PgPool,
    user_id: Uuid,
    terms: &[&str],
) -> Result<Option<WorkoutRow>, sqlx::Error> {
    let patterns: Vec<String> = terms.iter().map(|t| format!("%{t}%")).collect();
    sqlx::query_as::<_, WorkoutRow>(&format!(
        r#"
        SELECT {WORKOUT_COLUMNS} FROM workouts
        WHERE user_id = $1 AND (focus ILIKE ANY($2) OR name ILIKE ANY($2))
        ORDER BY created_at DESC
        LIMIT 1
        "#
    ))
    .bind(user_id)
    .bind(patterns)
    .fetch_optional(db)
    .await
}

pub async fn recent(db: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<WorkoutRow>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutRow>(&format!(
        "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}
