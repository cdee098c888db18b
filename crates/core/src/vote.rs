//! Votes cast by users on todos.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::DomainError;
use crate::id::{TodoId, UserId, VoteId};

/// Values of the `vote_value` database enum.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteValue {
    #[default]
    Upvote,
    Downvote,
}

impl VoteValue {
    pub const ALL: [VoteValue; 2] = [VoteValue::Downvote, VoteValue::Upvote];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteValue::Upvote => "UPVOTE",
            VoteValue::Downvote => "DOWNVOTE",
        }
    }
}

impl core::fmt::Display for VoteValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteValue {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPVOTE" => Ok(VoteValue::Upvote),
            "DOWNVOTE" => Ok(VoteValue::Downvote),
            other => Err(DomainError::validation(format!(
                "vote value must be one of: UPVOTE, DOWNVOTE (got {other:?})"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub todo_id: TodoId,
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
    pub created_by_id: UserId,
}

impl Entity for Vote {
    type Id = VoteId;
    const TABLE: &'static str = "vote";

    fn id(&self) -> VoteId {
        self.id
    }
}
