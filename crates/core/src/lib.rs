//! `todoboard-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** types for the todo board schema
//! (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod todo;
pub mod user;
pub mod vote;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{TodoId, UserId, VoteId};
pub use todo::{NewTodo, Todo, TodoFilter, TodoPatch};
pub use user::User;
pub use vote::{Vote, VoteValue};
