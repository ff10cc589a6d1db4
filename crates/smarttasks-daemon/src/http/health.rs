use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe plus reminder engine state.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "scheduler": state.scheduler.status(),
        "pending_reminders": state.scheduler.pending().len(),
        "reconcile_interval_secs": state.config.reminder.reconcile_interval().as_secs(),
    }))
}
