use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dataset", get(handlers::get_dataset))
        .route("/api/view", get(handlers::get_view))
        .with_state(state)
}
