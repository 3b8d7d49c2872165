//! Task endpoints
//!
//! # Endpoints
//!
//! - `GET /tasks` - List all tasks
//! - `POST /tasks` - Create a task
//! - `PUT /tasks/:id` - Update a task (overwrites all mutable fields)
//! - `DELETE /tasks/:id` - Delete a task
//!
//! All endpoints require a valid bearer token. Every successful
//! mutation pushes a `tasks_changed` tag to the live-update channel
//! after the database write lands.

use crate::{
    app::{AppState, AuthContext},
    channel::ChangeEvent,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use taskboard_shared::models::task::{Task, TaskInput};
use validator::Validate;

/// Task create/update request body.
///
/// Create and update share this shape because updates overwrite every
/// mutable field.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    /// Title (required, non-empty)
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Column id this task sits in (required, non-empty)
    #[validate(length(min = 1, message = "Status must not be empty"))]
    pub status: String,

    /// Priority label (required, non-empty)
    #[validate(length(min = 1, message = "Priority must not be empty"))]
    pub priority: String,

    /// Assignee display name
    #[serde(default)]
    pub assignee: String,

    /// Optional due date (YYYY-MM-DD)
    pub due_date: Option<NaiveDate>,
}

impl TaskRequest {
    fn into_input(self) -> TaskInput {
        TaskInput {
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            assignee: self.assignee,
            due_date: self.due_date,
        }
    }
}

/// List all tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list(&state.db).await?;
    Ok(Json(tasks))
}

/// Create a task
///
/// # Errors
///
/// - `422 Unprocessable Entity`: empty title/status/priority, or a
///   status that names no column
pub async fn create_task(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::create(&state.db, req.into_input()).await?;

    state.channel.broadcast(ChangeEvent::TasksChanged);
    Ok(Json(task))
}

/// Update a task, overwriting all mutable fields
///
/// # Errors
///
/// - `404 Not Found`: no task with this id
/// - `422 Unprocessable Entity`: invalid fields or unknown status
pub async fn update_task(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::update(&state.db, &id, req.into_input())
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    state.channel.broadcast(ChangeEvent::TasksChanged);
    Ok(Json(task))
}

/// Delete a task
///
/// # Errors
///
/// - `404 Not Found`: no task with this id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = Task::delete(&state.db, &id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    state.channel.broadcast(ChangeEvent::TasksChanged);
    Ok(Json(json!({ "success": true })))
}
