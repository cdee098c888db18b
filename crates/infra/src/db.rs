//! Database adapters (connection pools).

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

/// Opens a Postgres pool and checks that the server answers.
#[instrument(skip(url), err)]
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    tracing::info!(max_connections, "connected to postgres");

    Ok(pool)
}
