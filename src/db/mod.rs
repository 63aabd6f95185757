//! Database abstraction layer.
//!
//! This module provides trait-based abstractions for data access, so the
//! HTTP layer never names a concrete storage backend.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Domain entities (Todo, TodoPatch)
//! - `repository`: Trait definitions for data access
//! - `surreal`: SurrealDB-backed implementation

mod error;
mod models;
mod repository;
pub mod surreal;


pub use error::{DbError, DbResult};
pub use models::*;
pub use repository::*;
pub use surreal::SurrealDatabase;
