//! Postgres-backed todo repository.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepositoryError |
//! |------------|-----------------|
//! | no row returned by update/delete | `NotFound(id)` |
//! | `Database` (any SQLSTATE) | `Database` |
//! | `ColumnDecode` / `ColumnNotFound` | `Decode` |
//! | anything else (pool closed, io, tls) | `Database` |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, instrument};

use todoboard_core::{NewTodo, Todo, TodoFilter, TodoId, TodoPatch, UserId};

use super::{RepositoryError, RepositoryResult, TodoRepository};

const TODO_COLUMNS: &str = "id, text, completed, created_at, created_by_id";

#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: Arc<PgPool>,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[instrument(skip(self), fields(completed = ?filter.completed, row_count = tracing::field::Empty), err)]
    async fn find_many(&self, filter: TodoFilter) -> RepositoryResult<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TODO_COLUMNS}
            FROM todo
            WHERE ($1::boolean IS NULL OR completed = $1)
            ORDER BY id DESC
            "#
        ))
        .bind(filter.completed)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_many", e))?;

        let todos = rows
            .iter()
            .map(|row| decode_todo("find_many", row))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Span::current().record("row_count", todos.len());
        Ok(todos)
    }

    #[instrument(skip(self, new), err)]
    async fn create(&self, new: NewTodo) -> RepositoryResult<Todo> {
        // COALESCE keeps the column default when `completed` is absent.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO todo (text, completed, created_by_id)
            VALUES ($1, COALESCE($2, FALSE), $3)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(&new.text)
        .bind(new.completed)
        .bind(new.created_by_id.map(i32::from))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        decode_todo("create", &row)
    }

    #[instrument(skip(self), fields(todo_id = %id), err)]
    async fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryResult<Todo> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE todo
            SET completed = COALESCE($2, completed)
            WHERE id = $1
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(patch.completed)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?
        .ok_or(RepositoryError::NotFound(id))?;

        decode_todo("update", &row)
    }

    #[instrument(skip(self), fields(todo_id = %id), err)]
    async fn delete(&self, id: TodoId) -> RepositoryResult<Todo> {
        let row = sqlx::query(&format!(
            r#"
            DELETE FROM todo
            WHERE id = $1
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete", e))?
        .ok_or(RepositoryError::NotFound(id))?;

        decode_todo("delete", &row)
    }

    #[instrument(skip(self), fields(deleted = tracing::field::Empty), err)]
    async fn delete_many(&self) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM todo")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_many", e))?;

        Span::current().record("deleted", result.rows_affected());
        Ok(result.rows_affected())
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => RepositoryError::Database {
            operation,
            message: match db_err.code() {
                Some(code) => format!("{} (SQLSTATE {})", db_err.message(), code),
                None => db_err.message().to_string(),
            },
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => RepositoryError::Decode {
            operation,
            message: err.to_string(),
        },
        sqlx::Error::PoolClosed => RepositoryError::Database {
            operation,
            message: "connection pool closed".to_string(),
        },
        other => RepositoryError::Database {
            operation,
            message: other.to_string(),
        },
    }
}

fn decode_todo(operation: &'static str, row: &PgRow) -> RepositoryResult<Todo> {
    TodoRow::from_row(row)
        .map(Todo::from)
        .map_err(|e| RepositoryError::Decode {
            operation,
            message: e.to_string(),
        })
}

// SQLx row types

#[derive(Debug)]
struct TodoRow {
    id: i32,
    text: String,
    completed: bool,
    created_at: DateTime<Utc>,
    created_by_id: Option<i32>,
}

impl<'r> FromRow<'r, PgRow> for TodoRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TodoRow {
            id: row.try_get("id")?,
            text: row.try_get("text")?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
            created_by_id: row.try_get("created_by_id")?,
        })
    }
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: TodoId::new(row.id),
            text: row.text,
            completed: row.completed,
            created_at: row.created_at,
            created_by_id: row.created_by_id.map(UserId::new),
        }
    }
}
