//! Database layer
//!
//! This module provides connection pooling and the migration runner.
//!
//! - `pool`: PostgreSQL connection pool with a startup health check
//! - `migrations`: embedded sqlx migrations from `migrations/`
//!
//! Models live in the `models` module at the crate root.

pub mod migrations;
pub mod pool;
