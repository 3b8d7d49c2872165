//! Column endpoints
//!
//! # Endpoints
//!
//! - `GET /columns` - List columns in board order
//! - `POST /columns` - Create a column (400 with "max 20" at the cap)
//! - `PUT /columns/reorder` - Apply a full reordering
//! - `DELETE /columns/:id` - Delete a column, reassigning its tasks
//!
//! All endpoints require a valid bearer token. Successful mutations
//! push a `columns_changed` tag to the live-update channel; a rejected
//! create (cap hit) broadcasts nothing.

use crate::{
    app::{AppState, AuthContext},
    channel::ChangeEvent,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskboard_shared::models::column::{BoardColumn, CreateColumn};
use validator::Validate;

/// Column create request
#[derive(Debug, Deserialize, Validate)]
pub struct ColumnRequest {
    /// Display name (required, non-empty)
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Reorder request: every column id, in the desired new order
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<String>,
}

/// List columns in board order
pub async fn list_columns(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardColumn>>> {
    let columns = BoardColumn::list(&state.db).await?;
    Ok(Json(columns))
}

/// Create a column at the end of the board
///
/// # Errors
///
/// - `400 Bad Request`: the board already holds 20 columns
/// - `422 Unprocessable Entity`: empty name
pub async fn create_column(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<ColumnRequest>,
) -> ApiResult<Json<BoardColumn>> {
    req.validate()?;

    let column = BoardColumn::create(&state.db, CreateColumn { name: req.name }).await?;

    state.channel.broadcast(ChangeEvent::ColumnsChanged);
    Ok(Json(column))
}

/// Delete a column
///
/// Tasks in the deleted column move to the lowest-position survivor
/// (see the model layer for the no-survivor case).
///
/// # Errors
///
/// - `404 Not Found`: no column with this id
pub async fn delete_column(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = BoardColumn::delete(&state.db, &id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Column not found".to_string()));
    }

    state.channel.broadcast(ChangeEvent::ColumnsChanged);
    Ok(Json(json!({ "success": true })))
}

/// Apply a full reordering of the board's columns
///
/// # Errors
///
/// - `422 Unprocessable Entity`: `ordered_ids` is not a permutation of
///   the current column ids
pub async fn reorder_columns(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<Vec<BoardColumn>>> {
    let columns = BoardColumn::reorder(&state.db, &req.ordered_ids).await?;

    state.channel.broadcast(ChangeEvent::ColumnsChanged);
    Ok(Json(columns))
}
