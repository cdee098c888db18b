//! Writes generated stores to Postgres.

use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::instrument;

use todoboard_core::VoteValue;

use crate::model::{Table, TodoRow, UserRow, VoteRow};
use crate::plan::{Plan, PlanError};
use crate::store::Store;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("could not decode {table} row: {message}")]
    Decode { table: Table, message: String },
}

fn db_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> SeedError {
    move |source| SeedError::Database { operation, source }
}

/// Seeds a database that already carries the todo board schema.
#[derive(Debug, Clone)]
pub struct SeedClient {
    pool: PgPool,
}

impl SeedClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rows already in the database, wrapped as external rows so plans can
    /// connect to them and generated ids continue after them.
    ///
    /// Todos without an author are not connectable but still advance the
    /// todo id sequence.
    #[instrument(skip(self), err)]
    pub async fn current_store(&self) -> Result<Store, SeedError> {
        let mut rows = Store::new();

        rows.user = sqlx::query(r#"SELECT id, name, email, password, created_at FROM "user" ORDER BY id"#)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("load_users"))?
            .iter()
            .map(|r| -> Result<UserRow, sqlx::Error> {
                Ok(UserRow {
                    id: r.try_get("id")?,
                    name: r.try_get("name")?,
                    email: r.try_get("email")?,
                    password: r.try_get("password")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(db_err("decode_users"))?;

        rows.todo = sqlx::query(
            r#"
            SELECT id, text, completed, created_at, created_by_id
            FROM todo
            WHERE created_by_id IS NOT NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("load_todos"))?
        .iter()
        .map(|r| -> Result<TodoRow, sqlx::Error> {
            Ok(TodoRow {
                id: r.try_get("id")?,
                text: r.try_get("text")?,
                completed: r.try_get("completed")?,
                created_at: r.try_get("created_at")?,
                created_by_id: r.try_get("created_by_id")?,
            })
        })
        .collect::<Result<_, sqlx::Error>>()
        .map_err(db_err("decode_todos"))?;

        let votes = sqlx::query(
            r#"
            SELECT id, todo_id, value::text AS value, created_at, created_by_id
            FROM vote
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("load_votes"))?;

        for r in &votes {
            let value: String = r.try_get("value").map_err(db_err("decode_votes"))?;
            let value = value.parse::<VoteValue>().map_err(|e| SeedError::Decode {
                table: Table::Vote,
                message: e.to_string(),
            })?;
            rows.vote.push(VoteRow {
                id: r.try_get("id").map_err(db_err("decode_votes"))?,
                todo_id: r.try_get("todo_id").map_err(db_err("decode_votes"))?,
                value,
                created_at: r.try_get("created_at").map_err(db_err("decode_votes"))?,
                created_by_id: r.try_get("created_by_id").map_err(db_err("decode_votes"))?,
            });
        }

        let mut store = Store::external(rows);

        let max_todo: Option<i32> = sqlx::query_scalar("SELECT MAX(id) FROM todo")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("max_todo_id"))?;
        if let Some(max) = max_todo {
            store.claim_id(Table::Todo, max);
        }

        tracing::debug!(
            users = store.user.len(),
            todos = store.todo.len(),
            votes = store.vote.len(),
            "loaded existing rows"
        );
        Ok(store)
    }

    /// Inserts every non-external row of `store` in one transaction, then
    /// moves the serial sequences past the inserted ids.
    #[instrument(skip(self, store), fields(statements = tracing::field::Empty), err)]
    pub async fn execute(&self, store: &Store) -> Result<usize, SeedError> {
        let statements = store.to_sql();
        tracing::Span::current().record("statements", statements.len());

        let mut tx = self.pool.begin().await.map_err(db_err("begin_transaction"))?;

        for statement in &statements {
            sqlx::raw_sql(statement)
                .execute(&mut *tx)
                .await
                .map_err(db_err("insert_row"))?;
        }

        for table in Table::ALL.into_iter().filter(Table::has_serial_id) {
            let name = table.sql_name();
            sqlx::raw_sql(&format!(
                "SELECT setval(pg_get_serial_sequence('{name}', 'id'), COALESCE(MAX(id), 1), MAX(id) IS NOT NULL) FROM {name}"
            ))
            .execute(&mut *tx)
            .await
            .map_err(db_err("sync_sequence"))?;
        }

        tx.commit().await.map_err(db_err("commit_transaction"))?;
        tracing::info!(rows = statements.len(), "seeded database");
        Ok(statements.len())
    }

    /// Generates `plan` on top of the current database contents and writes
    /// the new rows.
    pub async fn run(&self, plan: &Plan) -> Result<Store, SeedError> {
        let initial = self.current_store().await?;
        let store = plan.generate(&initial)?;
        self.execute(&store).await?;
        Ok(store)
    }
}
