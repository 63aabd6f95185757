//! Domain models for the todo database.
//!
//! These models are storage-agnostic; each backend maps its own record shape
//! onto them.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Storage-assigned record key, in its string form.
pub type Id = String;

/// A titled, completable task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: Id,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub completed: bool,
}

/// Fields an update may change. `None` leaves the stored value untouched.
///
/// Serializes to exactly the storage field names, skipping absent fields, so
/// it can be merged into a record as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}
