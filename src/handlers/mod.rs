pub mod cards;

use axum::{routing::get, routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use cards::{due_cards, due_summary, get_card, submit_review};

pub async fn health() -> &'static str {
  "ok"
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/cards/{id}", get(get_card))
    .route("/api/cards/{id}/review", post(submit_review))
    .route("/api/due", get(due_cards))
    .route("/api/due/summary", get(due_summary))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
