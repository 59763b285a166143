mod dto;
mod handlers;
mod intents;
mod repo;
mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
