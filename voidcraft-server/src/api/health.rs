//! Health Check API Handler
//!
//! Liveness endpoint for monitoring.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::api::AppState;

/// GET /health
/// Reports liveness and the number of jobs held in memory
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "jobs": state.store.len() }))
}
