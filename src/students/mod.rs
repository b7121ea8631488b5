mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{MySqlStudentStore, StudentStore};

pub fn router() -> Router<AppState> {
    handlers::student_routes()
}
