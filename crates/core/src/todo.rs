//! Todo rows and the shapes used to query and mutate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{TodoId, UserId};

/// A persisted todo row, serialized exactly as the HTTP API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub created_by_id: Option<UserId>,
}

impl Entity for Todo {
    type Id = TodoId;
    const TABLE: &'static str = "todo";

    fn id(&self) -> TodoId {
        self.id
    }
}

/// Insert payload. `completed: None` takes the column default (`false`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub completed: Option<bool>,
    pub created_by_id: Option<UserId>,
}

impl NewTodo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.completed.is_none()
    }

    pub fn apply(&self, todo: &mut Todo) {
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// Row filter for listing todos. Results are always ordered by id, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
}

impl TodoFilter {
    /// Builds a filter from the raw `completed` query value.
    ///
    /// Only the literal `"true"` selects completed rows; any other present
    /// value selects open rows.
    pub fn from_query(completed: Option<&str>) -> Self {
        Self {
            completed: completed.map(|v| v == "true"),
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.completed.is_none_or(|c| todo.completed == c)
    }
}
