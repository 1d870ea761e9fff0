//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /api/health: liveness plus dataset readiness.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let status = state.agent.status();
    let dataset = status.lifecycle.store().map(|store| {
        let info = store.info();
        json!({
            "id": info.id,
            "loaded_at": info.loaded_at,
            "total_headers": info.total_headers,
            "total_items": info.total_items,
        })
    });

    Json(json!({
        "status": "ok",
        "agent_ready": status.lifecycle.is_ready(),
        "agent_loading": status.lifecycle.is_loading(),
        "last_error": status.last_error,
        "dataset": dataset,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
