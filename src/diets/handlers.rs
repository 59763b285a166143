use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateMealSlotRequest, DailyPlan, DateRange, DietFeedbackRequest, GenerateDietRequest, MealSlotFilter};
use super::repo_types::MealSlot;
use super::services;
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/diets", get(list_slots))
        .route("/diets/daily-plans", get(list_daily_plans))
        .route("/diets/:id", get(get_slot))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/diets", post(create_slot))
        .route("/diets/generate", post(generate))
        .route("/diets/:id", axum::routing::delete(delete_slot))
        .route("/diets/:id/feedback", post(submit_feedback))
}

fn location(id: Uuid) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&format!("/api/v1/diets/{id}")) {
        headers.insert(header::LOCATION, v);
    }
    headers
}

#[instrument(skip(state, body))]
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GenerateDietRequest>,
) -> Result<(StatusCode, Json<DailyPlan>), AppError> {
    let plan = services::generate_diet_plan(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state, body))]
pub async fn create_slot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMealSlotRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealSlot>), AppError> {
    let slot = services::create_slot(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, location(slot.id), Json(slot)))
}

#[instrument(skip(state))]
pub async fn list_slots(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<MealSlotFilter>,
) -> Result<Json<Vec<MealSlot>>, AppError> {
    Ok(Json(services::list_slots(&state, user_id, filter).await?))
}

#[instrument(skip(state))]
pub async fn list_daily_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<DailyPlan>>, AppError> {
    Ok(Json(services::list_daily_plans(&state, user_id, range).await?))
}

#[instrument(skip(state))]
pub async fn get_slot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealSlot>, AppError> {
    Ok(Json(services::get_slot(&state, user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn delete_slot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_slot(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<DietFeedbackRequest>,
) -> Result<Json<MealSlot>, AppError> {
    Ok(Json(services::submit_feedback(&state, user_id, id, body).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    fn app() -> (Router, String) {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        (read_routes().merge(write_routes()).with_state(state), token)
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn generate_requires_auth() {
        let (app, _) = app();
        let res = app
            .oneshot(
                Request::post("/diets/generate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"goal":"maintenance","calorie_target":2000}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn generate_validates_before_touching_storage() {
        let (app, token) = app();
        let res = app
            .oneshot(
                Request::post("/diets/generate")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"goal":"bulk","calorie_target":0,"meal_count":7}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = json_body(res).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["fields"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn feedback_rating_out_of_range_is_rejected() {
        let (app, token) = app();
        let res = app
            .oneshot(
                Request::post(format!("/diets/{}/feedback", Uuid::new_v4()))
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"rating":6}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["fields"][0]["field"], "rating");
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let (app, token) = app();
        let res = app
            .oneshot(
                Request::get("/diets/daily-plans?start_date=2024-05-02&end_date=2024-05-01")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
