use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::engine::types::{Difficulty, Exercise, Intensity, WorkoutStatus, WorkoutType};
use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct WorkoutRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub workout_type: String,
    pub intensity: String,
    pub difficulty: String,
    pub duration: i32,
    pub exercises: Json<Vec<Exercise>>,
    pub series_reps: String,
    pub frequency: String,
    pub load: f64,
    pub focus: String,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub status: String,
    pub rating: Option<f64>,
    pub completed_date: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub workout_type: WorkoutType,
    pub intensity: Intensity,
    pub difficulty: Difficulty,
    /// Minutes.
    pub duration: i32,
    pub exercises: Vec<Exercise>,
    pub series_reps: String,
    pub frequency: String,
    /// Reference load in kg.
    pub load: f64,
    pub focus: String,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub status: WorkoutStatus,
    pub rating: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn parse<T: std::str::FromStr<Err = crate::engine::types::UnknownVariant>>(raw: &str) -> Result<T, AppError> {
    raw.parse::<T>().map_err(|e| AppError::Internal(e.into()))
}

impl TryFrom<WorkoutRow> for Workout {
    type Error = AppError;

    fn try_from(r: WorkoutRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            description: r.description,
            workout_type: parse(&r.workout_type)?,
            intensity: parse(&r.intensity)?,
            difficulty: parse(&r.difficulty)?,
            duration: r.duration,
            exercises: r.exercises.0,
            series_reps: r.series_reps,
            frequency: r.frequency,
            load: r.load,
            focus: r.focus,
            muscle_groups: r.muscle_groups,
            equipment: r.equipment,
            status: parse(&r.status)?,
            rating: r.rating,
            completed_date: r.completed_date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub fn into_workouts(rows: Vec<WorkoutRow>) -> Result<Vec<Workout>, AppError> {
    rows.into_iter().map(Workout::try_from).collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkoutFeedbackRow {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: OffsetDateTime,
}

/// One performed session.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub rating: i32,
    pub duration_minutes: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
