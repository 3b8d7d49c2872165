//! API route handlers
//!
//! Handlers are organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Authentication endpoints (register, login)
//! - `tasks`: Task CRUD
//! - `columns`: Column management (create, delete, reorder)
//! - `ws`: Live-update WebSocket endpoint

pub mod auth;
pub mod columns;
pub mod health;
pub mod tasks;
pub mod ws;
