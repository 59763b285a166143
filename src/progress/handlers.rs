use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{ProgressQuery, ProgressRequest, ProgressStats};
use super::repo_types::ProgressEntry;
use super::services;
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/progress", get(list_entries).post(create_entry))
        .route("/progress/stats", get(stats))
        .route("/progress/export", get(export))
        .route(
            "/progress/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[instrument(skip(state, body))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ProgressRequest>,
) -> Result<(StatusCode, Json<ProgressEntry>), AppError> {
    let entry = services::create_entry(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ProgressQuery>,
) -> Result<Json<Vec<ProgressEntry>>, AppError> {
    Ok(Json(services::list_entries(&state, user_id, q).await?))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressEntry>, AppError> {
    Ok(Json(services::get_entry(&state, user_id, id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ProgressRequest>,
) -> Result<Json<ProgressEntry>, AppError> {
    Ok(Json(services::update_entry(&state, user_id, id, body).await?))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_entry(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProgressStats>, AppError> {
    Ok(Json(services::stats(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let body = services::export(&state, user_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"progress.csv\""),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn create_rejects_non_positive_weight() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::post("/progress")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"weight":-70}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_requires_auth() {
        let res = routes()
            .with_state(AppState::fake())
            .oneshot(Request::get("/progress/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
