use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateWorkoutRequest, GenerateWorkoutRequest, UpdateStatusRequest, WorkoutFeedbackRequest, WorkoutFilter};
use super::repo::{self, NewWorkout};
use super::repo_types::{into_workouts, Workout, WorkoutLog};
use crate::engine::{
    assembler::{focus_label, llm_exercises, static_exercises, WorkoutPlanInput},
    feedback::{adjust_workout, Rating, WorkoutParams},
    types::{Exercise, WorkoutStatus},
};
use crate::error::AppError;
use crate::state::AppState;

pub const DEFAULT_LOAD_KG: f64 = 20.0;
pub const DEFAULT_SERIES_REPS: &str = "3x12";
pub const DEFAULT_FREQUENCY: &str = "3x per week";

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn default_name(input: &WorkoutPlanInput, focus: &str) -> String {
    format!("{} workout: {}", capitalize(input.workout_type.as_str()), focus)
}

pub fn default_description(input: &WorkoutPlanInput, focus: &str) -> String {
    format!(
        "{}-minute {} {} session at {} intensity focused on {}.",
        input.duration_minutes, input.difficulty, input.workout_type, input.intensity, focus
    )
}

/// Exercise list for a generated workout, from the LLM or the static tables.
async fn generated_exercises(state: &AppState, input: &WorkoutPlanInput, use_llm: bool) -> Vec<Exercise> {
    if use_llm {
        llm_exercises(state.llm.as_ref(), input, state.config.llm.workout_max_tokens).await
    } else {
        static_exercises(input, state.config.template_variety)
    }
}

#[instrument(skip(state, req))]
pub async fn generate_workout_plan(
    state: &AppState,
    user_id: Uuid,
    req: GenerateWorkoutRequest,
) -> Result<Workout, AppError> {
    let input = req.validate()?;
    let exercises = generated_exercises(state, &input, req.use_llm).await;
    let focus = focus_label(&input.muscle_groups);
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_name(&input, &focus));
    let description = default_description(&input, &focus);

    let row = repo::insert(
        &state.db,
        user_id,
        NewWorkout {
            name: &name,
            description: &description,
            workout_type: input.workout_type,
            intensity: input.intensity,
            difficulty: input.difficulty,
            duration: input.duration_minutes as i32,
            exercises: &exercises,
            series_reps: DEFAULT_SERIES_REPS,
            frequency: DEFAULT_FREQUENCY,
            load: DEFAULT_LOAD_KG,
            focus: &focus,
            muscle_groups: &input.muscle_groups,
            equipment: &input.equipment,
        },
    )
    .await?;

    info!(
        %user_id,
        workout_id = %row.id,
        exercises = exercises.len(),
        llm = req.use_llm,
        "workout generated"
    );
    row.try_into()
}

#[instrument(skip(state, req))]
pub async fn create_workout(
    state: &AppState,
    user_id: Uuid,
    req: CreateWorkoutRequest,
) -> Result<Workout, AppError> {
    let valid = req.validate()?;
    let focus = focus_label(&valid.muscle_groups);
    let mut exercises = req.exercises.clone();
    for (i, e) in exercises.iter_mut().enumerate() {
        e.id = i as i64 + 1;
    }

    let row = repo::insert(
        &state.db,
        user_id,
        NewWorkout {
            name: req.name.trim(),
            description: req.description.trim(),
            workout_type: valid.workout_type,
            intensity: valid.intensity,
            difficulty: valid.difficulty,
            duration: req.duration_minutes as i32,
            exercises: &exercises,
            series_reps: req.series_reps.as_deref().unwrap_or(DEFAULT_SERIES_REPS),
            frequency: req.frequency.as_deref().unwrap_or(DEFAULT_FREQUENCY),
            load: req.load.unwrap_or(DEFAULT_LOAD_KG),
            focus: &focus,
            muscle_groups: &valid.muscle_groups,
            equipment: &valid.equipment,
        },
    )
    .await?;

    info!(%user_id, workout_id = %row.id, "workout registered");
    row.try_into()
}

pub async fn list_workouts(
    state: &AppState,
    user_id: Uuid,
    filter: WorkoutFilter,
) -> Result<Vec<Workout>, AppError> {
    let parsed = filter.parse()?;
    into_workouts(repo::list(&state.db, user_id, &parsed).await?)
}

pub async fn get_workout(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Workout, AppError> {
    repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("workout"))?
        .try_into()
}

pub async fn delete_workout(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("workout"));
    }
    info!(%user_id, workout_id = %id, "workout deleted");
    Ok(())
}

pub async fn update_status(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: UpdateStatusRequest,
) -> Result<Workout, AppError> {
    let status = req
        .status
        .parse::<WorkoutStatus>()
        .map_err(|e| AppError::field("status", e.to_string()))?;
    let row = repo::update_status(&state.db, user_id, id, status)
        .await?
        .ok_or(AppError::NotFound("workout"))?;
    info!(%user_id, workout_id = %id, %status, "workout status updated");
    row.try_into()
}

/// Records the rating and a session log, then nudges load and intensity.
#[instrument(skip(state, req))]
pub async fn submit_feedback(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: WorkoutFeedbackRequest,
) -> Result<Workout, AppError> {
    let rating = Rating::try_from(req.rating)?;
    if let Some(d) = req.duration_minutes {
        if d <= 0 {
            return Err(AppError::field("duration_minutes", "must be positive"));
        }
    }
    let current = get_workout(state, user_id, id).await?;

    let comment = req.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let event = repo::insert_feedback(&state.db, id, rating.value(), comment).await?;
    let duration = req
        .duration_minutes
        .map(|d| i32::try_from(d).unwrap_or(i32::MAX));
    repo::insert_log(&state.db, id, rating.value(), duration).await?;

    let adjusted = adjust_workout(
        WorkoutParams {
            load: current.load,
            intensity: current.intensity,
        },
        rating,
    );
    let row = repo::apply_feedback(&state.db, user_id, id, adjusted.load, adjusted.intensity)
        .await?
        .ok_or_else(|| {
            warn!(%user_id, workout_id = %id, feedback_id = %event.id, "workout vanished after feedback");
            AppError::NotFound("workout")
        })?;

    info!(
        %user_id,
        workout_id = %id,
        rating = event.rating,
        load = adjusted.load,
        intensity = %adjusted.intensity,
        "workout feedback applied"
    );
    row.try_into()
}

pub async fn list_logs(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Vec<WorkoutLog>, AppError> {
    // ownership check
    get_workout(state, user_id, id).await?;
    Ok(repo::list_logs(&state.db, id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Difficulty, Intensity, WorkoutType};
    use crate::llm::ScriptedLlm;
    use std::sync::Arc;

    fn legs(duration_minutes: u32) -> WorkoutPlanInput {
        WorkoutPlanInput {
            workout_type: WorkoutType::Strength,
            difficulty: Difficulty::Beginner,
            duration_minutes,
            muscle_groups: vec!["legs".into()],
            equipment: vec![],
            intensity: Intensity::Moderate,
        }
    }

    #[tokio::test]
    async fn llm_generation_uses_the_workout_token_budget() {
        let reply = r#"[{"name":"Squat","sets":3,"reps":10},{"name":"Lunge","sets":3,"reps":12}]"#;
        let llm = Arc::new(ScriptedLlm::reply(reply));
        let state = AppState::fake_with_llm(llm.clone());

        let exercises = generated_exercises(&state, &legs(40), true).await;
        assert_eq!(exercises.len(), 2);
        let budgets = llm.budgets.lock().unwrap().clone();
        assert_eq!(budgets, vec![state.config.llm.workout_max_tokens]);
        assert!(state.config.llm.workout_max_tokens > state.config.llm.chat_max_tokens);
    }

    #[tokio::test]
    async fn static_generation_never_calls_the_llm() {
        let llm = Arc::new(ScriptedLlm::failing());
        let state = AppState::fake_with_llm(llm.clone());
        let exercises = generated_exercises(&state, &legs(40), false).await;
        assert!(exercises.len() >= 4);
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn default_labels_describe_the_session() {
        let input = WorkoutPlanInput {
            workout_type: WorkoutType::Strength,
            difficulty: Difficulty::Beginner,
            duration_minutes: 15,
            muscle_groups: vec!["pernas".into()],
            equipment: vec![],
            intensity: Intensity::Moderate,
        };
        assert_eq!(default_name(&input, "pernas"), "Strength workout: pernas");
        assert_eq!(
            default_description(&input, "pernas"),
            "15-minute beginner strength session at moderate intensity focused on pernas."
        );
    }
}
