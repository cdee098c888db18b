//! Query layer for the `todo` table.
//!
//! `TodoRepository` is the seam the HTTP layer talks to. Two backends exist:
//! an in-memory map for dev/tests and a Postgres implementation.

pub mod in_memory;
pub mod postgres;

use thiserror::Error;

use todoboard_core::{NewTodo, Todo, TodoFilter, TodoId, TodoPatch};

pub use in_memory::InMemoryTodoRepository;
pub use postgres::PostgresTodoRepository;

/// Query-layer failure.
///
/// Every variant is an infrastructure concern from the caller's point of view;
/// the HTTP layer does not distinguish between them.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The targeted row does not exist.
    #[error("todo {0} not found")]
    NotFound(TodoId),

    /// The database rejected or failed the statement.
    #[error("database error in {operation}: {message}")]
    Database { operation: &'static str, message: String },

    /// A row came back in a shape we cannot decode.
    #[error("failed to decode row in {operation}: {message}")]
    Decode { operation: &'static str, message: String },

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("lock poisoned")]
    Poisoned,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// CRUD operations on todos.
#[async_trait::async_trait]
pub trait TodoRepository: Send + Sync {
    /// Rows matching `filter`, ordered by id descending.
    async fn find_many(&self, filter: TodoFilter) -> RepositoryResult<Vec<Todo>>;

    /// Inserts one row and returns it with its generated id and defaults.
    async fn create(&self, new: NewTodo) -> RepositoryResult<Todo>;

    /// Applies `patch` to row `id` and returns the row.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the row does not exist,
    /// even if the patch is empty.
    async fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryResult<Todo>;

    /// Deletes row `id` and returns what was deleted.
    async fn delete(&self, id: TodoId) -> RepositoryResult<Todo>;

    /// Deletes every row; returns how many were removed.
    async fn delete_many(&self) -> RepositoryResult<u64>;
}
