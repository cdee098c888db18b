//! Plan inputs: what a caller may pin down for each generated row.
//!
//! Every scalar is optional; unset columns are synthesized from the seed.
//! Relationship inputs come in two shapes:
//!
//! - *children* (user → todo, user → vote, todo → vote) create rows that hang
//!   off the row being generated. Child input types have no field for the
//!   parent they hang off, so it cannot be specified twice.
//! - *parents* (todo → user, vote → todo, vote → user) either create a new
//!   parent row from scalar inputs or connect to an existing row in the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use todoboard_core::VoteValue;

use crate::store::Store;

/// Seeds handed to a column callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnContext {
    /// Seed of the row, e.g. `todoboard/0/user/3`.
    pub model_seed: String,
    /// Seed of the column, e.g. `todoboard/0/user/3/email`.
    pub seed: String,
}

type ColumnFn<T> = Arc<dyn Fn(&ColumnContext) -> T + Send + Sync>;

/// A fixed value or a callback producing one.
#[derive(Clone)]
pub enum ColumnValue<T> {
    Fixed(T),
    Generate(ColumnFn<T>),
}

impl<T: Clone> ColumnValue<T> {
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&ColumnContext) -> T + Send + Sync + 'static,
    {
        ColumnValue::Generate(Arc::new(f))
    }

    pub fn resolve(&self, ctx: &ColumnContext) -> T {
        match self {
            ColumnValue::Fixed(v) => v.clone(),
            ColumnValue::Generate(f) => f(ctx),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for ColumnValue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ColumnValue::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            ColumnValue::Generate(_) => f.write_str("Generate(..)"),
        }
    }
}

impl<T> From<T> for ColumnValue<T> {
    fn from(value: T) -> Self {
        ColumnValue::Fixed(value)
    }
}

impl From<&str> for ColumnValue<String> {
    fn from(value: &str) -> Self {
        ColumnValue::Fixed(value.to_string())
    }
}

/// Context handed to a connect callback.
#[derive(Debug, Clone, Copy)]
pub struct ConnectContext<'a> {
    /// Index of the row being generated among its siblings.
    pub index: usize,
    /// Seed of the relationship field.
    pub seed: &'a str,
    /// Everything generated so far.
    pub store: &'a Store,
}

/// Picks the id of an existing row; `None` means nothing suitable exists.
pub type ConnectFn = Arc<dyn Fn(&ConnectContext<'_>) -> Option<i32> + Send + Sync>;

/// How to satisfy a parent relationship.
#[derive(Clone)]
pub enum Parent<S> {
    /// Create a new parent row from these inputs.
    Create(S),
    /// Reuse an existing row.
    Connect(ConnectFn),
}

impl<S> Parent<S> {
    pub fn connect<F>(f: F) -> Self
    where
        F: Fn(&ConnectContext<'_>) -> Option<i32> + Send + Sync + 'static,
    {
        Parent::Connect(Arc::new(f))
    }

    /// Connect to the row with this id.
    pub fn id(id: i32) -> Self {
        Parent::connect(move |_| Some(id))
    }
}

impl<S: core::fmt::Debug> core::fmt::Debug for Parent<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Parent::Create(s) => f.debug_tuple("Create").field(s).finish(),
            Parent::Connect(_) => f.write_str("Connect(..)"),
        }
    }
}

/// How many rows to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Exact(usize),
    /// Seed-determined count in `min..=max`.
    Between { min: usize, max: usize },
}

impl From<usize> for Count {
    fn from(n: usize) -> Self {
        Count::Exact(n)
    }
}

impl From<core::ops::RangeInclusive<usize>> for Count {
    fn from(r: core::ops::RangeInclusive<usize>) -> Self {
        Count::Between {
            min: *r.start(),
            max: *r.end(),
        }
    }
}

type EachFn<T> = Arc<dyn Fn(usize) -> T + Send + Sync>;

/// A list of rows to generate.
#[derive(Clone)]
pub enum Children<T> {
    List(Vec<T>),
    Repeat { count: Count, each: Option<EachFn<T>> },
}

impl<T> Children<T> {
    /// `count` rows with default inputs.
    pub fn x(count: impl Into<Count>) -> Self {
        Children::Repeat {
            count: count.into(),
            each: None,
        }
    }

    /// `count` rows whose inputs are built from their index.
    pub fn x_with<F>(count: impl Into<Count>, each: F) -> Self
    where
        F: Fn(usize) -> T + Send + Sync + 'static,
    {
        Children::Repeat {
            count: count.into(),
            each: Some(Arc::new(each)),
        }
    }
}

impl<T> From<Vec<T>> for Children<T> {
    fn from(items: Vec<T>) -> Self {
        Children::List(items)
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Children<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Children::List(items) => f.debug_tuple("List").field(items).finish(),
            Children::Repeat { count, each } => f
                .debug_struct("Repeat")
                .field("count", count)
                .field("each", &each.as_ref().map(|_| ".."))
                .finish(),
        }
    }
}

/// Fills unset fields from a lower-priority set of inputs.
pub trait Overlay {
    fn overlay(&self, defaults: &Self) -> Self;
}

macro_rules! scalars {
    ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            $(pub $field: Option<ColumnValue<$ty>>,)*
        }

        impl $name {
            $(
                pub fn $field(mut self, value: impl Into<ColumnValue<$ty>>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }

        impl Overlay for $name {
            fn overlay(&self, defaults: &Self) -> Self {
                Self {
                    $($field: self.$field.clone().or_else(|| defaults.$field.clone()),)*
                }
            }
        }
    };
}

scalars!(
    /// Columns of `migrations`.
    MigrationScalars {
        id: String,
        checksum: String,
        finished_at: Option<DateTime<Utc>>,
        migration_name: String,
        logs: Option<String>,
        rolled_back_at: Option<DateTime<Utc>>,
        started_at: DateTime<Utc>,
        applied_steps_count: i32,
    }
);

scalars!(
    /// Columns of `user`.
    UserScalars {
        id: i32,
        name: String,
        email: String,
        password: String,
        created_at: DateTime<Utc>,
    }
);

scalars!(
    /// Columns of `todo` (foreign keys are set through relationships).
    TodoScalars {
        id: i32,
        text: String,
        completed: bool,
        created_at: DateTime<Utc>,
    }
);

scalars!(
    /// Columns of `vote` (foreign keys are set through relationships).
    VoteScalars {
        id: i32,
        value: VoteValue,
        created_at: DateTime<Utc>,
    }
);

/// A root `user` row and what hangs off it.
#[derive(Debug, Clone, Default)]
pub struct UserInputs {
    pub scalars: UserScalars,
    pub todos: Option<Children<UserTodoInputs>>,
    pub votes: Option<Children<UserVoteInputs>>,
}

/// A root `todo` row.
#[derive(Debug, Clone, Default)]
pub struct TodoInputs {
    pub scalars: TodoScalars,
    pub user: Option<Parent<UserScalars>>,
    pub votes: Option<Children<TodoVoteInputs>>,
}

/// A root `vote` row.
#[derive(Debug, Clone, Default)]
pub struct VoteInputs {
    pub scalars: VoteScalars,
    pub todo: Option<Parent<TodoScalars>>,
    pub user: Option<Parent<UserScalars>>,
}

/// A `todo` created under a user: its author is that user.
#[derive(Debug, Clone, Default)]
pub struct UserTodoInputs {
    pub scalars: TodoScalars,
    pub votes: Option<Children<TodoVoteInputs>>,
}

/// A `vote` cast by the user it is created under.
#[derive(Debug, Clone, Default)]
pub struct UserVoteInputs {
    pub scalars: VoteScalars,
    pub todo: Option<Parent<TodoScalars>>,
}

/// A `vote` on the todo it is created under.
#[derive(Debug, Clone, Default)]
pub struct TodoVoteInputs {
    pub scalars: VoteScalars,
    pub user: Option<Parent<UserScalars>>,
}

impl From<UserScalars> for UserInputs {
    fn from(scalars: UserScalars) -> Self {
        Self {
            scalars,
            ..Default::default()
        }
    }
}

impl From<TodoScalars> for TodoInputs {
    fn from(scalars: TodoScalars) -> Self {
        Self {
            scalars,
            ..Default::default()
        }
    }
}

impl From<VoteScalars> for VoteInputs {
    fn from(scalars: VoteScalars) -> Self {
        Self {
            scalars,
            ..Default::default()
        }
    }
}

impl From<TodoScalars> for UserTodoInputs {
    fn from(scalars: TodoScalars) -> Self {
        Self {
            scalars,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ColumnContext {
        ColumnContext {
            model_seed: "s/0/user/0".to_string(),
            seed: "s/0/user/0/name".to_string(),
        }
    }

    #[test]
    fn column_values_resolve_fixed_and_callbacks() {
        let fixed: ColumnValue<String> = "Ada".into();
        assert_eq!(fixed.resolve(&ctx()), "Ada");

        let generated = ColumnValue::with(|c: &ColumnContext| format!("from {}", c.seed));
        assert_eq!(generated.resolve(&ctx()), "from s/0/user/0/name");
    }

    #[test]
    fn overlay_prefers_own_fields() {
        let plan = UserScalars::default().name("Plan");
        let model = UserScalars::default().name("Model").password("secret");

        let merged = plan.overlay(&model);
        assert_eq!(merged.name.unwrap().resolve(&ctx()), "Plan");
        assert_eq!(merged.password.unwrap().resolve(&ctx()), "secret");
        assert!(merged.email.is_none());
    }

    #[test]
    fn counts_from_ranges() {
        assert_eq!(Count::from(3), Count::Exact(3));
        assert_eq!(Count::from(1..=4), Count::Between { min: 1, max: 4 });
    }
}
