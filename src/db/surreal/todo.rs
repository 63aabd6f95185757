//! SurrealDB TodoRepository implementation.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::db::{DbError, DbResult, Todo, TodoPatch, TodoRepository};

/// Projection shared by every statement that hands records back.
///
/// The record id is reduced to its key and the datetime is cast to its
/// RFC 3339 text, so the row deserializes into plain strings.
const TODO_FIELDS: &str =
    "record::id(id) AS id, <string> created_at AS created_at, title, completed";

/// A todo row as it comes out of the database.
#[derive(Debug, Deserialize)]
struct TodoRecord {
    id: String,
    created_at: String,
    title: String,
    completed: bool,
}

impl TryFrom<TodoRecord> for Todo {
    type Error = DbError;

    fn try_from(record: TodoRecord) -> DbResult<Self> {
        let created_at = DateTime::parse_from_rfc3339(&record.created_at)
            .map_err(|e| DbError::InvalidRecord {
                message: format!(
                    "todo '{}' has invalid created_at '{}': {}",
                    record.id, record.created_at, e
                ),
            })?
            .with_timezone(&Utc);

        Ok(Todo {
            id: record.id,
            created_at,
            title: record.title,
            completed: record.completed,
        })
    }
}

/// SurrealDB-backed todo repository.
pub struct SurrealTodoRepository<'a> {
    pub(crate) db: &'a Surreal<Any>,
    pub(crate) table: &'a str,
    pub(crate) timeout: Duration,
}

impl SurrealTodoRepository<'_> {
    /// Run `op` under the per-call deadline.
    pub(super) async fn bounded<T>(&self, op: impl Future<Output = DbResult<T>>) -> DbResult<T> {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| DbError::Timeout {
                after: self.timeout,
            })?
    }

    async fn fetch_all(&self) -> DbResult<Vec<Todo>> {
        let mut response = self
            .db
            .query(format!("SELECT {TODO_FIELDS} FROM type::table($table)"))
            .bind(("table", self.table.to_string()))
            .await?
            .check()?;

        let records: Vec<TodoRecord> = response.take(0)?;
        records.into_iter().map(Todo::try_from).collect()
    }

    async fn insert(&self, title: &str) -> DbResult<Todo> {
        let mut response = self
            .db
            .query(
                "LET $created = CREATE type::table($table) \
                 CONTENT { title: $title, completed: false, created_at: time::now() }",
            )
            .query(format!("SELECT {TODO_FIELDS} FROM $created"))
            .bind(("table", self.table.to_string()))
            .bind(("title", title.to_string()))
            .await?
            .check()?;

        let records: Vec<TodoRecord> = response.take(1)?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| DbError::InvalidRecord {
                message: "create returned no record".to_string(),
            })?;
        Todo::try_from(record)
    }

    async fn merge(&self, id: &str, patch: &TodoPatch) -> DbResult<()> {
        // UPDATE on a missing record id matches nothing rather than creating it.
        let mut response = self
            .db
            .query("LET $updated = UPDATE type::thing($table, $id) MERGE $patch")
            .query("SELECT VALUE record::id(id) FROM $updated")
            .bind(("table", self.table.to_string()))
            .bind(("id", id.to_string()))
            .bind(("patch", patch.clone()))
            .await?
            .check()?;

        let touched: Vec<String> = response.take(1)?;
        if touched.is_empty() {
            return Err(DbError::not_found(id));
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> DbResult<()> {
        let mut response = self
            .db
            .query("LET $deleted = DELETE type::thing($table, $id) RETURN BEFORE")
            .query("SELECT VALUE record::id(id) FROM $deleted")
            .bind(("table", self.table.to_string()))
            .bind(("id", id.to_string()))
            .await?
            .check()?;

        let removed: Vec<String> = response.take(1)?;
        if removed.is_empty() {
            return Err(DbError::not_found(id));
        }
        Ok(())
    }
}

impl TodoRepository for SurrealTodoRepository<'_> {
    async fn list(&self) -> DbResult<Vec<Todo>> {
        self.bounded(self.fetch_all()).await
    }

    async fn create(&self, title: &str) -> DbResult<Todo> {
        self.bounded(self.insert(title)).await
    }

    async fn update(&self, id: &str, patch: &TodoPatch) -> DbResult<()> {
        self.bounded(self.merge(id, patch)).await
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        self.bounded(self.remove(id)).await
    }
}
