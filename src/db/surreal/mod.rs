//! SurrealDB implementation of the database traits.
//!
//! This module provides a SurrealDB-backed implementation of the repository
//! traits defined in the parent module. The engine is picked from the
//! endpoint scheme, so `mem://` gives an embedded in-memory store.

mod connection;
mod todo;


pub use connection::SurrealDatabase;
pub use todo::SurrealTodoRepository;
