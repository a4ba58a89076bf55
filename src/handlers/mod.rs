pub mod conversations;
pub mod health;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/conversations", post(conversations::start))
        .route(
            "/api/conversations/:id/messages",
            post(conversations::send_message),
        )
        .route(
            "/api/conversations/:id",
            delete(conversations::end),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
