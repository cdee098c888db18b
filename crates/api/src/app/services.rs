//! Storage wiring: picks the todo repository backend from configuration.

use std::sync::Arc;

use anyhow::Context;

use todoboard_infra::{
    config::{Config, StorageBackend},
    db,
    migrate::Migrator,
    InMemoryTodoRepository, PostgresTodoRepository, TodoRepository,
};

/// Shared per-process services handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    todos: Arc<dyn TodoRepository>,
    backend: &'static str,
}

impl AppServices {
    pub fn new(todos: Arc<dyn TodoRepository>, backend: &'static str) -> Self {
        Self { todos, backend }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTodoRepository::new()), "in_memory")
    }

    pub fn todos(&self) -> &dyn TodoRepository {
        self.todos.as_ref()
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    match &config.storage {
        StorageBackend::InMemory => {
            tracing::warn!("DATABASE_URL not set; todos are kept in memory only");
            Ok(AppServices::in_memory())
        }
        StorageBackend::Postgres { url, max_connections } => {
            let pool = db::connect(url, *max_connections)
                .await
                .context("failed to connect to Postgres")?;

            if config.run_migrations {
                let report = Migrator::default()
                    .run(&pool)
                    .await
                    .context("failed to apply migrations")?;
                tracing::info!(
                    applied = report.applied.len(),
                    already_applied = report.already_applied.len(),
                    "schema up to date"
                );
            }

            Ok(AppServices::new(
                Arc::new(PostgresTodoRepository::new(pool)),
                "postgres",
            ))
        }
    }
}
