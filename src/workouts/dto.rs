use serde::Deserialize;

use crate::engine::{
    assembler::WorkoutPlanInput,
    types::{Difficulty, Exercise, Intensity, WorkoutStatus, WorkoutType},
};
use crate::error::{AppError, Validator};

/// Longest session accepted, in minutes.
pub const MAX_DURATION_MINUTES: i64 = 600;

fn clean(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_opt<T: std::str::FromStr>(raw: Option<&str>) -> Result<Option<T>, T::Err> {
    raw.map(str::parse::<T>).transpose()
}

#[derive(Debug, Deserialize)]
pub struct GenerateWorkoutRequest {
    pub workout_type: String,
    pub difficulty: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub intensity: Option<String>,
    /// Ask the LLM instead of the static tables.
    #[serde(default)]
    pub use_llm: bool,
    pub name: Option<String>,
}

impl GenerateWorkoutRequest {
    pub fn validate(&self) -> Result<WorkoutPlanInput, AppError> {
        let workout_type = self.workout_type.parse::<WorkoutType>();
        let difficulty = self.difficulty.parse::<Difficulty>();
        let intensity = parse_opt::<Intensity>(self.intensity.as_deref());

        let mut v = Validator::new();
        v.check(workout_type.is_ok(), "workout_type", "unknown workout type")
            .check(difficulty.is_ok(), "difficulty", "unknown difficulty")
            .check(
                (1..=MAX_DURATION_MINUTES).contains(&self.duration_minutes),
                "duration_minutes",
                "must be between 1 and 600",
            )
            .check(intensity.is_ok(), "intensity", "unknown intensity");
        v.finish()?;

        let invalid = |field: &str| AppError::field(field, "invalid value");
        Ok(WorkoutPlanInput {
            workout_type: workout_type.map_err(|_| invalid("workout_type"))?,
            difficulty: difficulty.map_err(|_| invalid("difficulty"))?,
            duration_minutes: self.duration_minutes as u32,
            muscle_groups: clean(&self.muscle_groups),
            equipment: clean(&self.equipment),
            intensity: intensity.map_err(|_| invalid("intensity"))?.unwrap_or_default(),
        })
    }
}

/// Manually registered workout.
#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub workout_type: String,
    pub intensity: Option<String>,
    pub difficulty: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    pub series_reps: Option<String>,
    pub frequency: Option<String>,
    pub load: Option<f64>,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

pub struct ValidWorkout {
    pub workout_type: WorkoutType,
    pub intensity: Intensity,
    pub difficulty: Difficulty,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
}

impl CreateWorkoutRequest {
    pub fn validate(&self) -> Result<ValidWorkout, AppError> {
        let workout_type = self.workout_type.parse::<WorkoutType>();
        let difficulty = self.difficulty.parse::<Difficulty>();
        let intensity = parse_opt::<Intensity>(self.intensity.as_deref());

        let mut v = Validator::new();
        v.check(!self.name.trim().is_empty(), "name", "is required")
            .check(workout_type.is_ok(), "workout_type", "unknown workout type")
            .check(difficulty.is_ok(), "difficulty", "unknown difficulty")
            .check(intensity.is_ok(), "intensity", "unknown intensity")
            .check(
                (1..=MAX_DURATION_MINUTES).contains(&self.duration_minutes),
                "duration_minutes",
                "must be between 1 and 600",
            )
            .check(
                self.load.map_or(true, |l| l.is_finite() && l >= 0.0),
                "load",
                "must not be negative",
            );
        v.finish()?;

        let invalid = |field: &str| AppError::field(field, "invalid value");
        Ok(ValidWorkout {
            workout_type: workout_type.map_err(|_| invalid("workout_type"))?,
            intensity: intensity.map_err(|_| invalid("intensity"))?.unwrap_or_default(),
            difficulty: difficulty.map_err(|_| invalid("difficulty"))?,
            muscle_groups: clean(&self.muscle_groups),
            equipment: clean(&self.equipment),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutFilter {
    pub workout_type: Option<String>,
    pub intensity: Option<String>,
    pub status: Option<String>,
    pub min_load: Option<f64>,
    pub max_load: Option<f64>,
}

pub struct ParsedFilter {
    pub workout_type: Option<WorkoutType>,
    pub intensity: Option<Intensity>,
    pub status: Option<WorkoutStatus>,
    pub min_load: Option<f64>,
    pub max_load: Option<f64>,
}

impl WorkoutFilter {
    pub fn parse(&self) -> Result<ParsedFilter, AppError> {
        let workout_type = parse_opt::<WorkoutType>(self.workout_type.as_deref());
        let intensity = parse_opt::<Intensity>(self.intensity.as_deref());
        let status = parse_opt::<WorkoutStatus>(self.status.as_deref());

        let mut v = Validator::new();
        v.check(workout_type.is_ok(), "workout_type", "unknown workout type")
            .check(intensity.is_ok(), "intensity", "unknown intensity")
            .check(status.is_ok(), "status", "unknown status");
        v.finish()?;

        let invalid = |field: &str| AppError::field(field, "invalid value");
        Ok(ParsedFilter {
            workout_type: workout_type.map_err(|_| invalid("workout_type"))?,
            intensity: intensity.map_err(|_| invalid("intensity"))?,
            status: status.map_err(|_| invalid("status"))?,
            min_load: self.min_load,
            max_load: self.max_load,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutFeedbackRequest {
    pub rating: i64,
    pub duration_minutes: Option<i64>,
    pub comment: Option<String>,
}
