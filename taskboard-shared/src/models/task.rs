//! Task model and database operations
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id TEXT PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     status TEXT NOT NULL,
//!     priority TEXT NOT NULL,
//!     assignee TEXT NOT NULL DEFAULT '',
//!     due_date DATE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! `status` references `columns.id` without a database foreign key;
//! instead every write checks that the column exists and rejects an
//! unknown status. Column deletion keeps the reference valid by
//! reassigning affected tasks (see [`super::column::BoardColumn::delete`]).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// `status` does not name an existing column
    #[error("unknown status '{0}': no such column")]
    UnknownStatus(String),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4 string)
    pub id: String,

    /// Title
    pub title: String,

    /// Free-form description, empty string when absent
    pub description: String,

    /// Column id this task sits in
    pub status: String,

    /// Priority label (e.g. "low", "medium", "high")
    pub priority: String,

    /// Assignee display name, empty string when unassigned
    pub assignee: String,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating or fully updating a task.
///
/// Updates overwrite every mutable field, so create and update share
/// this shape.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Lists all tasks, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, assignee, due_date, created_at
            FROM tasks
            ORDER BY created_at
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds a task by ID.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, assignee, due_date, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Creates a task with a fresh UUID v4 id.
    ///
    /// # Errors
    ///
    /// [`TaskError::UnknownStatus`] when `input.status` names no column.
    pub async fn create(pool: &PgPool, input: TaskInput) -> Result<Self, TaskError> {
        ensure_status_exists(pool, &input.status).await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, title, description, status, priority, assignee, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, status, priority, assignee, due_date, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(input.title)
        .bind(input.description)
        .bind(input.status)
        .bind(input.priority)
        .bind(input.assignee)
        .bind(input.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Overwrites every mutable field of a task in one UPDATE.
    ///
    /// Returns `None` when the id does not exist.
    ///
    /// # Errors
    ///
    /// [`TaskError::UnknownStatus`] when `input.status` names no column.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        input: TaskInput,
    ) -> Result<Option<Self>, TaskError> {
        ensure_status_exists(pool, &input.status).await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, priority = $5,
                assignee = $6, due_date = $7
            WHERE id = $1
            RETURNING id, title, description, status, priority, assignee, due_date, created_at
            "#,
        )
        .bind(id)
        .bind(input.title)
        .bind(input.description)
        .bind(input.status)
        .bind(input.priority)
        .bind(input.assignee)
        .bind(input.due_date)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task. Returns `false` if the id did not exist.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Rejects writes whose status points at a column that doesn't exist.
async fn ensure_status_exists(pool: &PgPool, status: &str) -> Result<(), TaskError> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM columns WHERE id = $1)")
        .bind(status)
        .fetch_one(pool)
        .await?;

    if !exists {
        return Err(TaskError::UnknownStatus(status.to_string()));
    }

    Ok(())
}
