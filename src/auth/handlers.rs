use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest, UpdateProfileRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN},
        repo::NewUser,
        repo_types::User,
    },
    engine::types::Goal,
    error::{AppError, Validator},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: user.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut v = Validator::new();
    v.check(is_valid_email(&payload.email), "email", "invalid email")
        .check(
            payload.password.len() >= MIN_PASSWORD_LEN,
            "password",
            "must be at least 8 characters",
        );
    if let Err(e) = v.finish() {
        warn!(email = %payload.email, "register rejected");
        return Err(e);
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            email: &payload.email,
            password_hash: &hash,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::field("email", "invalid email"));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized("Invalid refresh token".into())
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let goal = match payload.fitness_goal.as_deref() {
        Some(raw) => Some(
            raw.parse::<Goal>()
                .map_err(|e| AppError::field("fitness_goal", e.to_string()))?,
        ),
        None => None,
    };

    let mut v = Validator::new();
    v.check(
        payload.weight.map_or(true, |w| w.is_finite() && w > 0.0),
        "weight",
        "must be positive",
    )
    .check(
        payload.height.map_or(true, |h| h.is_finite() && h > 0.0),
        "height",
        "must be positive",
    );
    v.finish()?;

    let user = User::update_profile(&state.db, user_id, &payload, goal.as_ref().map(Goal::as_str))
        .await?
        .ok_or(AppError::NotFound("user"))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}
