use crate::state::AppState;
use axum::Router;

mod avatar;
mod claims;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
mod validation;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::users_routes())
}
