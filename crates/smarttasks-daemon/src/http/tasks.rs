//! Task CRUD. Every mutation goes through `TaskManager`, whose events drive
//! the reminder engine; handlers never touch the scheduler directly.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use smarttasks_core::{Task, TaskId};
use smarttasks_tasks::TaskDraft;
use std::sync::Arc;

use super::{task_error, ApiResult};
use crate::app::AppState;

#[derive(Deserialize)]
pub struct CompletionRequest {
    pub completed: bool,
}

pub async fn list_tasks(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Task>>> {
    state.tasks.list().map(Json).map_err(task_error)
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TaskDraft>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(&draft).map_err(task_error)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
    Json(draft): Json<TaskDraft>,
) -> ApiResult<Json<Task>> {
    state.tasks.update(id, &draft).map(Json).map_err(task_error)
}

pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
    Json(req): Json<CompletionRequest>,
) -> ApiResult<Json<Task>> {
    state
        .tasks
        .set_completed(id, req.completed)
        .map(Json)
        .map_err(task_error)
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(id).map_err(task_error)?;
    Ok(StatusCode::NO_CONTENT)
}
