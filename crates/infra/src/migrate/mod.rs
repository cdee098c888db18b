//! Embedded schema migrations with a ledger table.
//!
//! Each migration runs in its own transaction together with its ledger row,
//! so a failed migration leaves neither schema changes nor a ledger entry
//! behind. Applied migrations are identified by name; their SHA-256 checksum
//! must not change afterwards.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Ledger of applied migrations.
pub const LEDGER_TABLE: &str = "_migrations";

const CREATE_LEDGER: &str = r#"
CREATE TABLE IF NOT EXISTS _migrations (
    id                   TEXT PRIMARY KEY,
    checksum             TEXT NOT NULL,
    finished_at          TIMESTAMPTZ,
    migration_name       TEXT NOT NULL UNIQUE,
    logs                 TEXT,
    rolled_back_at       TIMESTAMPTZ,
    started_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    applied_steps_count  INTEGER NOT NULL DEFAULT 0
)
"#;

/// A named block of SQL applied once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub fn checksum(&self) -> String {
        checksum(self.sql)
    }
}

/// Migrations shipped with this crate, in application order.
pub const MIGRATIONS: &[Migration] = &[Migration {
    name: "0001_init",
    sql: include_str!("../../migrations/0001_init.sql"),
}];

/// Hex-encoded SHA-256 of a migration body.
pub fn checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration {name} was modified after it was applied (ledger {recorded}, file {current})")]
    ChecksumMismatch {
        name: String,
        recorded: String,
        current: String,
    },

    #[error("migration {0} started but never finished; fix the database and clear its ledger row")]
    Dirty(String),

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

fn db_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> MigrationError {
    move |source| MigrationError::Database { operation, source }
}

/// Ledger row as stored in [`LEDGER_TABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub id: String,
    pub migration_name: String,
    pub checksum: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rolled_back_at: Option<DateTime<Utc>>,
    pub applied_steps_count: i32,
}

impl AppliedMigration {
    fn is_complete(&self) -> bool {
        self.finished_at.is_some() && self.rolled_back_at.is_none()
    }
}

/// Outcome of [`Migrator::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<&'static str>,
    pub already_applied: Vec<&'static str>,
}

/// What to do with one migration given the ledger contents.
#[derive(Debug, PartialEq, Eq)]
enum Plan {
    Apply,
    Skip,
}

fn plan_migration(
    migration: &Migration,
    ledger: &[AppliedMigration],
) -> Result<Plan, MigrationError> {
    let Some(row) = ledger.iter().find(|r| r.migration_name == migration.name) else {
        return Ok(Plan::Apply);
    };

    if !row.is_complete() {
        return Err(MigrationError::Dirty(migration.name.to_string()));
    }

    let current = migration.checksum();
    if row.checksum != current {
        return Err(MigrationError::ChecksumMismatch {
            name: migration.name.to_string(),
            recorded: row.checksum.clone(),
            current,
        });
    }

    Ok(Plan::Skip)
}

#[derive(Debug, Clone)]
pub struct Migrator {
    migrations: &'static [Migration],
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new(MIGRATIONS)
    }
}

impl Migrator {
    pub fn new(migrations: &'static [Migration]) -> Self {
        Self { migrations }
    }

    /// Reads the ledger (creating it if needed).
    pub async fn applied(&self, pool: &PgPool) -> Result<Vec<AppliedMigration>, MigrationError> {
        sqlx::raw_sql(CREATE_LEDGER)
            .execute(pool)
            .await
            .map_err(db_err("create_ledger"))?;

        let rows = sqlx::query(
            r#"
            SELECT
                id,
                migration_name,
                checksum,
                started_at,
                finished_at,
                rolled_back_at,
                applied_steps_count
            FROM _migrations
            ORDER BY started_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(db_err("load_ledger"))?;

        rows.into_iter()
            .map(|row| {
                Ok(AppliedMigration {
                    id: row.try_get("id")?,
                    migration_name: row.try_get("migration_name")?,
                    checksum: row.try_get("checksum")?,
                    started_at: row.try_get("started_at")?,
                    finished_at: row.try_get("finished_at")?,
                    rolled_back_at: row.try_get("rolled_back_at")?,
                    applied_steps_count: row.try_get("applied_steps_count")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(db_err("decode_ledger"))
    }

    /// Applies every migration not yet recorded in the ledger.
    #[instrument(skip(self, pool), err)]
    pub async fn run(&self, pool: &PgPool) -> Result<MigrationReport, MigrationError> {
        let ledger = self.applied(pool).await?;
        let mut report = MigrationReport::default();

        for migration in self.migrations {
            match plan_migration(migration, &ledger)? {
                Plan::Skip => report.already_applied.push(migration.name),
                Plan::Apply => {
                    apply_one(pool, migration).await?;
                    tracing::info!(migration = migration.name, "applied migration");
                    report.applied.push(migration.name);
                }
            }
        }

        Ok(report)
    }
}

async fn apply_one(pool: &PgPool, migration: &Migration) -> Result<(), MigrationError> {
    let mut tx = pool.begin().await.map_err(db_err("begin_transaction"))?;

    let id = Uuid::now_v7().to_string();
    sqlx::query(
        r#"
        INSERT INTO _migrations (id, checksum, migration_name, started_at)
        VALUES ($1, $2, $3, NOW())
        "#,
    )
    .bind(&id)
    .bind(migration.checksum())
    .bind(migration.name)
    .execute(&mut *tx)
    .await
    .map_err(db_err("insert_ledger_row"))?;

    sqlx::raw_sql(migration.sql)
        .execute(&mut *tx)
        .await
        .map_err(db_err("apply_migration"))?;

    sqlx::query(
        r#"
        UPDATE _migrations
        SET finished_at = NOW(), applied_steps_count = applied_steps_count + 1
        WHERE id = $1
        "#,
    )
    .bind(&id)
    .execute(&mut *tx)
    .await
    .map_err(db_err("finish_ledger_row"))?;

    tx.commit().await.map_err(db_err("commit_transaction"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_row(m: &Migration, checksum: String, finished: bool) -> AppliedMigration {
        AppliedMigration {
            id: "1".to_string(),
            migration_name: m.name.to_string(),
            checksum,
            started_at: Utc::now(),
            finished_at: finished.then(Utc::now),
            rolled_back_at: None,
            applied_steps_count: i32::from(finished),
        }
    }

    #[test]
    fn checksum_is_stable_hex_sha256() {
        let a = checksum("CREATE TABLE t (id INT);");
        assert_eq!(a.len(), 64);
        assert_eq!(a, checksum("CREATE TABLE t (id INT);"));
        assert_ne!(a, checksum("CREATE TABLE t (id BIGINT);"));
    }

    #[test]
    fn embedded_schema_creates_all_tables() {
        let sql = MIGRATIONS[0].sql;
        for table in ["\"user\"", "todo", "vote", "vote_value"] {
            assert!(sql.contains(table), "missing {table}");
        }
    }

    #[test]
    fn unknown_migration_is_applied() {
        let m = &MIGRATIONS[0];
        assert_eq!(plan_migration(m, &[]).unwrap(), Plan::Apply);
    }

    #[test]
    fn finished_migration_with_same_checksum_is_skipped() {
        let m = &MIGRATIONS[0];
        let ledger = vec![ledger_row(m, m.checksum(), true)];
        assert_eq!(plan_migration(m, &ledger).unwrap(), Plan::Skip);
    }

    #[test]
    fn edited_migration_is_rejected() {
        let m = &MIGRATIONS[0];
        let ledger = vec![ledger_row(m, checksum("something else"), true)];
        assert!(matches!(
            plan_migration(m, &ledger),
            Err(MigrationError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn unfinished_migration_is_dirty() {
        let m = &MIGRATIONS[0];
        let ledger = vec![ledger_row(m, m.checksum(), false)];
        assert!(matches!(plan_migration(m, &ledger), Err(MigrationError::Dirty(_))));
    }
}
