use axum::{Router, routing::post};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::bridge::StreamBridge;

pub mod handlers;
pub mod models;

/// Immutable per-process state shared by all requests.
pub struct AppState {
    pub bridge: StreamBridge,
    pub keep_alive: Duration,
}

impl AppState {
    pub fn new(bridge: StreamBridge, keep_alive: Duration) -> AppState {
        AppState { bridge, keep_alive }
    }
}

pub fn create_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/search", post(handlers::search_handler))
        .with_state(state);

    // Static file serving for the UI
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(cors)
}
