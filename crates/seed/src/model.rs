//! Row shapes of the four seeded tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use todoboard_core::{Entity, Todo, User, Vote, VoteValue};

/// Tables known to the generator, in foreign-key order (parents first).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Migrations,
    User,
    Todo,
    Vote,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Migrations, Table::User, Table::Todo, Table::Vote];

    /// Name used in seed paths.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Migrations => "migrations",
            Table::User => User::TABLE,
            Table::Todo => Todo::TABLE,
            Table::Vote => Vote::TABLE,
        }
    }

    /// Identifier as it must appear in SQL (`user` is reserved in Postgres).
    pub fn sql_name(&self) -> &'static str {
        match self {
            Table::Migrations => "_migrations",
            Table::User => "\"user\"",
            Table::Todo => "todo",
            Table::Vote => "vote",
        }
    }

    /// Whether rows are keyed by a serial integer.
    pub fn has_serial_id(&self) -> bool {
        !matches!(self, Table::Migrations)
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Table::Migrations => 0,
            Table::User => 1,
            Table::Todo => 2,
            Table::Vote => 3,
        }
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRow {
    pub id: String,
    pub checksum: String,
    pub finished_at: Option<DateTime<Utc>>,
    pub migration_name: String,
    pub logs: Option<String>,
    pub rolled_back_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub applied_steps_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRow {
    pub id: i32,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub created_by_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRow {
    pub id: i32,
    pub todo_id: i32,
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
    pub created_by_id: i32,
}
