//! Notification polling: GET /notifications, DELETE /notifications/{task_id}.
//!
//! Clients poll for reminders delivered while they were away and dismiss them
//! once shown.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use smarttasks_core::TaskId;
use std::sync::Arc;

use super::{api_error, ApiResult};
use crate::{app::AppState, inbox::Notification};

#[derive(Serialize)]
pub struct NotificationResponse {
    pub notifications: Vec<Notification>,
}

pub async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<NotificationResponse> {
    Json(NotificationResponse {
        notifications: state.inbox.list(),
    })
}

pub async fn dismiss_notification(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<TaskId>,
) -> ApiResult<StatusCode> {
    if state.inbox.dismiss(task_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("no notification for task {task_id}"),
        ))
    }
}
