//! API Module
//!
//! HTTP API layer for the crafting service.
//! Each submodule handles endpoints for a specific concern.

pub mod craft;
pub mod error;
pub mod health;

use axum::{
    Json, Router,
    http::{Method, StatusCode, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::repository::JobStore;
use crate::service::CraftService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub craft: Arc<CraftService>,
    pub store: Arc<dyn JobStore>,
}

impl AppState {
    pub fn new(craft: Arc<CraftService>, store: Arc<dyn JobStore>) -> Self {
        Self { craft, store }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // Every OPTIONS request is treated as a preflight and answered here with
    // an empty 200, with or without an Origin header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Craft endpoints
        .route("/craft", post(craft::submit_craft))
        .route("/craft/status", get(craft::craft_status))
        .route("/craft/download", get(craft::craft_download))
        // Unknown paths and unsupported methods look the same to clients
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not Found" })),
    )
}
