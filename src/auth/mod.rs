use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
mod handlers;
pub mod jwt;
mod password;
mod repo;
pub mod repo_types;

pub use jwt::AuthUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
