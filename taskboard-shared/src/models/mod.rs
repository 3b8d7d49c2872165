//! Database models for the taskboard
//!
//! Each model owns its table and exposes the operations the API is
//! built from:
//!
//! - `user`: accounts and credential storage
//! - `column`: board lanes with a dense ordering invariant
//! - `task`: work items whose `status` references a column id

pub mod column;
pub mod task;
pub mod user;
