use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One body measurement; at most one per user and day.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressEntry {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub date: Date,
    pub weight: f64,
    pub body_fat: Option<f64>,
    pub muscle_mass: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
