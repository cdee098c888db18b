//! Infrastructure layer: query layer over the todo board schema, database
//! wiring, schema migrations and configuration.

pub mod config;
pub mod db;
pub mod migrate;
pub mod repository;

pub use config::{Config, ConfigError, StorageBackend};
pub use repository::{InMemoryTodoRepository, PostgresTodoRepository, RepositoryError, TodoRepository};
