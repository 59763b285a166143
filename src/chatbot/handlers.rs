use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{ChatRequest, ChatResponse, HistoryQuery};
use super::repo_types::ChatMessage;
use super::services;
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/history", get(history))
}

#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = services::chat(&state, user_id, &body.message).await?;
    Ok(Json(ChatResponse { response }))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    Ok(Json(services::history(&state, user_id, q.limit).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{
        body::Body,
        extract::FromRef,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn chat_requires_auth() {
        let res = routes()
            .with_state(AppState::fake())
            .oneshot(
                Request::post("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn blank_message_is_bad_request() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::post("/chat")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"user_message":"  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
