//! Board column model and database operations
//!
//! Columns are the board's lanes. Their `position` values must stay a
//! dense zero-based sequence (`0..count`) through every create, delete,
//! and reorder; clients rely on it when rendering the board, so the
//! multi-statement operations here all run inside a transaction.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE columns (
//!     id TEXT PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     position INTEGER NOT NULL DEFAULT 0
//! );
//! ```
//!
//! The four seed columns carry fixed ids (`todo`, `inprogress`,
//! `review`, `done`) so tasks referencing them stay resolvable across
//! fresh databases; user-created columns get UUID v4 string ids.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Hard cap on the number of columns a board may hold.
pub const MAX_COLUMNS: i64 = 20;

/// The columns seeded into an empty board: (id, name, position).
const DEFAULT_COLUMNS: [(&str, &str, i32); 4] = [
    ("todo", "To Do", 0),
    ("inprogress", "In Progress", 1),
    ("review", "In Review", 2),
    ("done", "Done", 3),
];

/// Error type for column operations
#[derive(Debug, thiserror::Error)]
pub enum ColumnError {
    /// The board already holds the maximum number of columns
    #[error("column limit reached (max 20)")]
    LimitExceeded,

    /// A reorder request did not list every column exactly once
    #[error("ordered_ids must contain every column id exactly once")]
    InvalidReorder,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Board column row
///
/// `position` is serialized as `"order"` in API payloads.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardColumn {
    /// Column ID (fixed string for seed columns, UUID v4 string otherwise)
    pub id: String,

    /// Display name
    pub name: String,

    /// Zero-based position on the board
    #[serde(rename = "order")]
    pub position: i32,
}

/// Input for creating a new column
#[derive(Debug, Clone)]
pub struct CreateColumn {
    /// Display name
    pub name: String,
}

impl BoardColumn {
    /// Lists all columns ordered by position.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let columns = sqlx::query_as::<_, BoardColumn>(
            "SELECT id, name, position FROM columns ORDER BY position",
        )
        .fetch_all(pool)
        .await?;

        Ok(columns)
    }

    /// Finds a column by ID.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let column = sqlx::query_as::<_, BoardColumn>(
            "SELECT id, name, position FROM columns WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(column)
    }

    /// Counts all columns.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM columns")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Creates a column at the end of the board.
    ///
    /// The new column's position is the pre-insert count, keeping the
    /// dense sequence intact. Insert and cap check share a transaction:
    /// if the insert pushes the count past [`MAX_COLUMNS`] the
    /// transaction rolls back, so the persisted state never exceeds the
    /// limit.
    ///
    /// # Errors
    ///
    /// [`ColumnError::LimitExceeded`] at the cap (mapped to HTTP 400).
    pub async fn create(pool: &PgPool, data: CreateColumn) -> Result<Self, ColumnError> {
        let mut tx = pool.begin().await?;

        let (position,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM columns")
            .fetch_one(&mut *tx)
            .await?;

        let column = sqlx::query_as::<_, BoardColumn>(
            r#"
            INSERT INTO columns (id, name, position)
            VALUES ($1, $2, $3)
            RETURNING id, name, position
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&data.name)
        .bind(position as i32)
        .fetch_one(&mut *tx)
        .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM columns")
            .fetch_one(&mut *tx)
            .await?;

        if count > MAX_COLUMNS {
            tx.rollback().await?;
            return Err(ColumnError::LimitExceeded);
        }

        tx.commit().await?;
        Ok(column)
    }

    /// Deletes a column, reassigning its tasks to the lowest-position
    /// survivor.
    ///
    /// When no column survives, task statuses are left pointing at the
    /// deleted id, an accepted dangling state the task layer tolerates.
    /// Survivors' positions are compacted back to `0..count` before the
    /// transaction commits.
    ///
    /// Returns `false` if the column did not exist.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, ColumnError> {
        let mut tx = pool.begin().await?;

        let existing = sqlx::query_as::<_, BoardColumn>(
            "SELECT id, name, position FROM columns WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        let fallback = sqlx::query_as::<_, BoardColumn>(
            "SELECT id, name, position FROM columns WHERE id != $1 ORDER BY position LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(fallback) = fallback {
            sqlx::query("UPDATE tasks SET status = $1 WHERE status = $2")
                .bind(&fallback.id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM columns WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Compact survivors so positions stay 0..count with no gaps
        sqlx::query(
            r#"
            UPDATE columns
            SET position = ranked.rank - 1
            FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY position) AS rank
                FROM columns
            ) ranked
            WHERE columns.id = ranked.id
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Applies a full reordering: each column's position becomes its
    /// index in `ordered_ids`.
    ///
    /// The sequence must be a permutation of every existing column id;
    /// a partial or duplicated list is rejected outright rather than
    /// leaving stale positions behind.
    ///
    /// # Errors
    ///
    /// [`ColumnError::InvalidReorder`] when `ordered_ids` is not a
    /// permutation of the current column ids (mapped to HTTP 422).
    pub async fn reorder(pool: &PgPool, ordered_ids: &[String]) -> Result<Vec<Self>, ColumnError> {
        let mut tx = pool.begin().await?;

        let existing: Vec<(String,)> = sqlx::query_as("SELECT id FROM columns")
            .fetch_all(&mut *tx)
            .await?;

        let existing: std::collections::HashSet<&str> =
            existing.iter().map(|(id,)| id.as_str()).collect();
        let requested: std::collections::HashSet<&str> =
            ordered_ids.iter().map(String::as_str).collect();

        if ordered_ids.len() != existing.len() || requested != existing {
            tx.rollback().await?;
            return Err(ColumnError::InvalidReorder);
        }

        for (index, id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE columns SET position = $1 WHERE id = $2")
                .bind(index as i32)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Self::list(pool).await.map_err(ColumnError::from)
    }

    /// Seeds the four default columns into an empty board.
    ///
    /// Idempotent: returns `false` without touching anything when any
    /// column already exists.
    pub async fn seed_defaults(pool: &PgPool) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM columns")
            .fetch_one(&mut *tx)
            .await?;

        if count > 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        for (id, name, position) in DEFAULT_COLUMNS {
            sqlx::query("INSERT INTO columns (id, name, position) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(name)
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_serializes_position_as_order() {
        let column = BoardColumn {
            id: "todo".to_string(),
            name: "To Do".to_string(),
            position: 0,
        };

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["order"], 0);
        assert!(json.get("position").is_none());
    }

    #[test]
    fn test_column_deserializes_order_field() {
        let column: BoardColumn =
            serde_json::from_str(r#"{"id":"done","name":"Done","order":3}"#).unwrap();
        assert_eq!(column.position, 3);
    }

    #[test]
    fn test_default_columns_are_dense() {
        for (index, (_, _, position)) in DEFAULT_COLUMNS.iter().enumerate() {
            assert_eq!(*position, index as i32);
        }
    }

    #[test]
    fn test_limit_error_message_reports_cap() {
        let message = ColumnError::LimitExceeded.to_string();
        assert!(message.contains("max 20"), "got: {message}");
    }
}
