use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateWorkoutRequest, GenerateWorkoutRequest, UpdateStatusRequest, WorkoutFeedbackRequest, WorkoutFilter};
use super::repo_types::{Workout, WorkoutLog};
use super::services;
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts))
        .route("/workouts/:id", get(get_workout))
        .route("/workouts/:id/logs", get(list_logs))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", post(create_workout))
        .route("/workouts/generate", post(generate))
        .route("/workouts/:id", axum::routing::delete(delete_workout))
        .route("/workouts/:id/status", patch(update_status))
        .route("/workouts/:id/feedback", post(submit_feedback))
}

fn location(id: Uuid) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&format!("/api/v1/workouts/{id}")) {
        headers.insert(header::LOCATION, v);
    }
    headers
}

#[instrument(skip(state, body))]
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GenerateWorkoutRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Workout>), AppError> {
    let workout = services::generate_workout_plan(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, location(workout.id), Json(workout)))
}

#[instrument(skip(state, body))]
pub async fn create_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Workout>), AppError> {
    let workout = services::create_workout(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, location(workout.id), Json(workout)))
}

#[instrument(skip(state))]
pub async fn list_workouts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<WorkoutFilter>,
) -> Result<Json<Vec<Workout>>, AppError> {
    Ok(Json(services::list_workouts(&state, user_id, filter).await?))
}

#[instrument(skip(state))]
pub async fn get_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Workout>, AppError> {
    Ok(Json(services::get_workout(&state, user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn delete_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_workout(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Workout>, AppError> {
    Ok(Json(services::update_status(&state, user_id, id, body).await?))
}

#[instrument(skip(state, body))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<WorkoutFeedbackRequest>,
) -> Result<Json<Workout>, AppError> {
    Ok(Json(services::submit_feedback(&state, user_id, id, body).await?))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<WorkoutLog>>, AppError> {
    Ok(Json(services::list_logs(&state, user_id, id).await?))
}
