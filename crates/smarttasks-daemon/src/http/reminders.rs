use axum::{extract::State, Json};
use serde::Serialize;
use smarttasks_reminder::{ArmedAlarm, ReminderConfig, SchedulerStatus};
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct RemindersResponse {
    pub status: SchedulerStatus,
    pub armed: Option<ArmedAlarm>,
    /// Earliest first.
    pub pending: Vec<ReminderConfig>,
}

/// GET /reminders
pub async fn reminders_handler(State(state): State<Arc<AppState>>) -> Json<RemindersResponse> {
    Json(RemindersResponse {
        status: state.scheduler.status(),
        armed: state.scheduler.armed(),
        pending: state.scheduler.pending(),
    })
}
