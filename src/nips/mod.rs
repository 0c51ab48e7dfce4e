mod compose;
mod dto;
mod format;
pub mod handlers;
mod html;
#[cfg(test)]
pub mod memory;
pub mod model;
pub mod repo;
pub mod repo_types;
mod seed;
mod services;
mod templates;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_router())
        .merge(handlers::write_router())
}
