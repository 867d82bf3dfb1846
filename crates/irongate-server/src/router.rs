//! Router construction: one function assembling routes against a shared
//! `State`, with CORS/trace layers from `tower-http`.

use std::sync::Arc;

use axum::{routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze::analyze))
        .route("/send", post(handlers::send::send))
        .route("/events/batch", post(handlers::events::batch))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
