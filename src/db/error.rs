//! Database error types.
//!
//! This module provides abstracted error types for database operations.
//! It uses miette for fancy diagnostic output and thiserror for derive macros.
//! The `Display` text never includes the driver's own message; that stays in
//! the `source` chain for server-side logging.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Entity not found: {entity_type} with id '{id}'")]
    #[diagnostic(code(todo_api::db::not_found))]
    NotFound { entity_type: String, id: String },

    #[error("Failed to connect to database at {endpoint}")]
    #[diagnostic(
        code(todo_api::db::connection_error),
        help("Is the database running? Check --db-endpoint and credentials.")
    )]
    Connection {
        endpoint: String,
        #[source]
        source: surrealdb::Error,
    },

    #[error("Database query failed")]
    #[diagnostic(code(todo_api::db::query_error))]
    Query {
        #[source]
        source: surrealdb::Error,
    },

    #[error("Database did not respond within {}s", .after.as_secs_f32())]
    #[diagnostic(code(todo_api::db::timeout))]
    Timeout { after: Duration },

    #[error("Stored record is malformed: {message}")]
    #[diagnostic(code(todo_api::db::invalid_record))]
    InvalidRecord { message: String },
}

impl DbError {
    pub(crate) fn not_found(id: &str) -> Self {
        DbError::NotFound {
            entity_type: "Todo".to_string(),
            id: id.to_string(),
        }
    }
}

impl From<surrealdb::Error> for DbError {
    fn from(source: surrealdb::Error) -> Self {
        DbError::Query { source }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
