pub mod health;
pub mod notifications;
pub mod reminders;
pub mod tasks;

use axum::{http::StatusCode, Json};
use serde::Serialize;
use smarttasks_tasks::TaskError;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// Map a task-store failure onto a status code.
pub fn task_error(e: TaskError) -> (StatusCode, Json<ApiError>) {
    let status = match e {
        TaskError::NotFound { .. } => StatusCode::NOT_FOUND,
        TaskError::Invalid(_) => StatusCode::BAD_REQUEST,
        TaskError::Database(ref err) => {
            tracing::error!(error = %err, "task store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ApiError::from(e)))
}
