//! Dataset reload endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::state::AppState;

/// POST /api/reload: start a background load unless one is running.
pub async fn reload(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.agent.reload() {
        Some(_) => (StatusCode::ACCEPTED, Json(json!({ "status": "reloading" }))),
        None => (StatusCode::OK, Json(json!({ "status": "already_loading" }))),
    }
}
