//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing the HTTP layer.

use std::future::Future;

use crate::db::{
    DbResult,
    models::{Todo, TodoPatch},
};

/// Repository for Todo operations.
///
/// Every call is a round-trip to the backend; nothing is cached.
pub trait TodoRepository {
    /// Get all todos, in the backend's natural order.
    fn list(&self) -> impl Future<Output = DbResult<Vec<Todo>>> + Send;

    /// Create a todo. The backend assigns the id and creation time;
    /// `completed` starts out false.
    fn create(&self, title: &str) -> impl Future<Output = DbResult<Todo>> + Send;

    /// Apply `patch` to an existing todo. Never creates a record.
    fn update(&self, id: &str, patch: &TodoPatch) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a todo by ID.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Combined database interface.
pub trait Database: Send + Sync {
    type Todos<'a>: TodoRepository + Send + Sync
    where
        Self: 'a;

    /// Get the todo repository.
    fn todos(&self) -> Self::Todos<'_>;
}
