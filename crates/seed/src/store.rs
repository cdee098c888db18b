//! Generated rows per table, plus SQL rendering.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{MigrationRow, Table, TodoRow, UserRow, VoteRow};

/// Rows keyed by table, with the serial-id state needed to keep generating.
///
/// Rows counted as *external* already exist in the database: they can be
/// connected to but are never rendered by [`Store::to_sql`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub migrations: Vec<MigrationRow>,
    pub user: Vec<UserRow>,
    pub todo: Vec<TodoRow>,
    pub vote: Vec<VoteRow>,
    /// Last serial id handed out per table (indexed by `Table::index`).
    last_ids: [i32; 4],
    /// Leading rows per table that are not ours to insert.
    external: [usize; 4],
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps rows that already exist in the database.
    ///
    /// Serial ids continue after the largest existing id.
    pub fn external(mut rows: Store) -> Self {
        rows.sync_sequences();
        for table in Table::ALL {
            rows.external[table.index()] = rows.len(table);
        }
        rows
    }

    pub fn len(&self, table: Table) -> usize {
        match table {
            Table::Migrations => self.migrations.len(),
            Table::User => self.user.len(),
            Table::Todo => self.todo.len(),
            Table::Vote => self.vote.len(),
        }
    }

    /// Number of rows `to_sql` would render for `table`.
    pub fn pending(&self, table: Table) -> usize {
        self.len(table) - self.external[table.index()]
    }

    /// Serial ids of every row in `table`, in insertion order.
    pub fn ids(&self, table: Table) -> Vec<i32> {
        match table {
            Table::Migrations => Vec::new(),
            Table::User => self.user.iter().map(|r| r.id).collect(),
            Table::Todo => self.todo.iter().map(|r| r.id).collect(),
            Table::Vote => self.vote.iter().map(|r| r.id).collect(),
        }
    }

    /// Allocates the next serial id for `table`.
    pub(crate) fn next_id(&mut self, table: Table) -> i32 {
        let slot = &mut self.last_ids[table.index()];
        *slot += 1;
        *slot
    }

    /// Records an explicitly chosen id so later allocations skip past it.
    pub(crate) fn claim_id(&mut self, table: Table, id: i32) {
        let slot = &mut self.last_ids[table.index()];
        *slot = (*slot).max(id);
    }

    pub(crate) fn take_sequences_from(&mut self, other: &Store) {
        for (mine, theirs) in self.last_ids.iter_mut().zip(other.last_ids) {
            *mine = (*mine).max(theirs);
        }
    }

    fn sync_sequences(&mut self) {
        for table in Table::ALL {
            if let Some(max) = self.ids(table).into_iter().max() {
                self.claim_id(table, max);
            }
        }
    }

    /// Appends the rows `other` holds beyond the first `since` rows per table.
    pub(crate) fn absorb_new_rows(&mut self, other: &Store, since: &Store) {
        self.migrations
            .extend_from_slice(&other.migrations[since.migrations.len()..]);
        self.user.extend_from_slice(&other.user[since.user.len()..]);
        self.todo.extend_from_slice(&other.todo[since.todo.len()..]);
        self.vote.extend_from_slice(&other.vote[since.vote.len()..]);
        self.take_sequences_from(other);
    }

    /// One `INSERT` per non-external row, parents before children.
    pub fn to_sql(&self) -> Vec<String> {
        let mut out = Vec::new();

        let skip = |t: Table| self.external[t.index()];

        for r in &self.migrations[skip(Table::Migrations)..] {
            out.push(insert(
                Table::Migrations,
                &[
                    "id",
                    "checksum",
                    "finished_at",
                    "migration_name",
                    "logs",
                    "rolled_back_at",
                    "started_at",
                    "applied_steps_count",
                ],
                &[
                    text(&r.id),
                    text(&r.checksum),
                    r.finished_at.as_ref().map_or_else(null, timestamp),
                    text(&r.migration_name),
                    r.logs.as_deref().map_or_else(null, text),
                    r.rolled_back_at.as_ref().map_or_else(null, timestamp),
                    timestamp(&r.started_at),
                    r.applied_steps_count.to_string(),
                ],
            ));
        }

        for r in &self.user[skip(Table::User)..] {
            out.push(insert(
                Table::User,
                &["id", "name", "email", "password", "created_at"],
                &[
                    r.id.to_string(),
                    text(&r.name),
                    text(&r.email),
                    text(&r.password),
                    timestamp(&r.created_at),
                ],
            ));
        }

        for r in &self.todo[skip(Table::Todo)..] {
            out.push(insert(
                Table::Todo,
                &["id", "text", "completed", "created_at", "created_by_id"],
                &[
                    r.id.to_string(),
                    text(&r.text),
                    boolean(r.completed),
                    timestamp(&r.created_at),
                    r.created_by_id.to_string(),
                ],
            ));
        }

        for r in &self.vote[skip(Table::Vote)..] {
            out.push(insert(
                Table::Vote,
                &["id", "todo_id", "value", "created_at", "created_by_id"],
                &[
                    r.id.to_string(),
                    r.todo_id.to_string(),
                    text(r.value.as_str()),
                    timestamp(&r.created_at),
                    r.created_by_id.to_string(),
                ],
            ));
        }

        out
    }
}

fn insert(table: Table, columns: &[&str], values: &[String]) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.sql_name(),
        columns.join(", "),
        values.join(", ")
    )
}

/// Quoted SQL string literal.
pub fn text(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn timestamp(value: &DateTime<Utc>) -> String {
    text(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn boolean(value: bool) -> String {
    let literal = if value { "TRUE" } else { "FALSE" };
    literal.to_string()
}

fn null() -> String {
    "NULL".to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use todoboard_core::VoteValue;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn sample() -> Store {
        let mut store = Store::new();
        store.vote.push(VoteRow {
            id: 1,
            todo_id: 1,
            value: VoteValue::Downvote,
            created_at: at(0),
            created_by_id: 1,
        });
        store.todo.push(TodoRow {
            id: 1,
            text: "don't panic".to_string(),
            completed: true,
            created_at: at(0),
            created_by_id: 1,
        });
        store.user.push(UserRow {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
            created_at: at(0),
        });
        store
    }

    #[test]
    fn text_literals_escape_quotes() {
        assert_eq!(text("it's"), "'it''s'");
        assert_eq!(text(""), "''");
    }

    #[test]
    fn to_sql_orders_parents_first() {
        let sql = sample().to_sql();
        assert_eq!(sql.len(), 3);
        assert!(sql[0].starts_with("INSERT INTO \"user\""));
        assert!(sql[1].starts_with("INSERT INTO todo"));
        assert!(sql[2].starts_with("INSERT INTO vote"));
        assert!(sql[1].contains("'don''t panic', TRUE, '1970-01-01T00:00:00.000Z', 1"));
        assert!(sql[2].contains("'DOWNVOTE'"));
    }

    #[test]
    fn migration_rows_render_nulls() {
        let mut store = Store::new();
        store.migrations.push(MigrationRow {
            id: "m1".to_string(),
            checksum: "abc".to_string(),
            finished_at: None,
            migration_name: "0001_init".to_string(),
            logs: None,
            rolled_back_at: None,
            started_at: at(60),
            applied_steps_count: 0,
        });
        let sql = store.to_sql();
        assert_eq!(
            sql[0],
            "INSERT INTO _migrations (id, checksum, finished_at, migration_name, logs, rolled_back_at, started_at, applied_steps_count) \
             VALUES ('m1', 'abc', NULL, '0001_init', NULL, NULL, '1970-01-01T00:01:00.000Z', 0)"
        );
    }

    #[test]
    fn external_rows_are_not_rendered_and_ids_continue() {
        let mut store = Store::external(sample());
        assert!(store.to_sql().is_empty());
        assert_eq!(store.pending(Table::User), 0);
        assert_eq!(store.next_id(Table::User), 2);
        assert_eq!(store.next_id(Table::Vote), 2);
    }
}
