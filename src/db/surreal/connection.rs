//! SurrealDB connection management.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::{debug, info};

use super::SurrealTodoRepository;
use crate::config::DbConfig;
use crate::db::{Database, DbError, DbResult};

/// SurrealDB database implementation.
///
/// Holds one client handle for the whole process. The handle is safe for
/// concurrent use, so repositories borrow it without locking.
pub struct SurrealDatabase {
    pub(super) db: Surreal<Any>,
    table: String,
    timeout: Duration,
}

impl SurrealDatabase {
    /// Dial the configured endpoint, sign in when credentials are given, and
    /// select the namespace and database.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        let connection_error = |source: surrealdb::Error| DbError::Connection {
            endpoint: config.endpoint.clone(),
            source,
        };

        debug!(endpoint = %config.endpoint, "Connecting to database");
        let db = any::connect(config.endpoint.as_str())
            .await
            .map_err(connection_error)?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(connection_error)?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(connection_error)?;

        info!(
            endpoint = %config.endpoint,
            namespace = %config.namespace,
            database = %config.database,
            table = %config.table,
            "Database connected"
        );

        Ok(Self {
            db,
            table: config.table.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Create an in-memory database (useful for testing).
    pub async fn in_memory() -> DbResult<Self> {
        Self::connect(&DbConfig::in_memory()).await
    }
}

impl Database for SurrealDatabase {
    type Todos<'a> = SurrealTodoRepository<'a>;

    fn todos(&self) -> Self::Todos<'_> {
        SurrealTodoRepository {
            db: &self.db,
            table: &self.table,
            timeout: self.timeout,
        }
    }
}
