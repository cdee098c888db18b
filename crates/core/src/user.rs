use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::UserId;

/// A user row. `password` holds whatever the writer stored; nothing here hashes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;
    const TABLE: &'static str = "user";

    fn id(&self) -> UserId {
        self.id
    }
}
