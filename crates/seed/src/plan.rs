//! Plans: composable descriptions of rows to generate.

use chrono::Duration;
use thiserror::Error;

use crate::inputs::{
    Children, ColumnContext, ColumnValue, ConnectContext, ConnectFn, Count, MigrationScalars,
    Overlay, Parent, TodoInputs, TodoScalars, TodoVoteInputs, UserInputs, UserScalars,
    UserTodoInputs, UserVoteInputs, VoteInputs, VoteScalars,
};
use crate::model::{MigrationRow, Table, TodoRow, UserRow, VoteRow};
use crate::store::Store;
use crate::synth;

/// Seed used when neither a plan nor any enclosing plan sets one.
pub const DEFAULT_SEED: &str = "todoboard";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid count for {table}: min {min} is greater than max {max}")]
    InvalidCount { table: Table, min: usize, max: usize },

    #[error("connect callback for {table} at {seed} returned no row")]
    NothingToConnect { table: Table, seed: String },

    #[error("{table} row {id} does not exist in the store")]
    UnknownParent { table: Table, id: i32 },
}

/// Per-table defaults applied under every plan that inherits them.
#[derive(Clone, Default)]
pub struct ModelDefaults<S> {
    /// Values used for fields the plan leaves unset.
    pub data: S,
    /// When set, parents of this table that the plan does not specify are
    /// always connected through this callback instead of being created.
    pub connect: Option<ConnectFn>,
}

impl<S: core::fmt::Debug> core::fmt::Debug for ModelDefaults<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelDefaults")
            .field("data", &self.data)
            .field("connect", &self.connect.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Models {
    pub migrations: ModelDefaults<MigrationScalars>,
    pub user: ModelDefaults<UserScalars>,
    pub todo: ModelDefaults<TodoScalars>,
    pub vote: ModelDefaults<VoteScalars>,
}

/// Options of a plan. Unset options are inherited from the enclosing
/// `pipe`/`merge`, then fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Connect unspecified parents to existing store rows (round-robin)
    /// instead of creating new ones.
    pub auto_connect: Option<bool>,
    pub seed: Option<String>,
    pub models: Option<Models>,
}

impl PlanOptions {
    pub fn seeded(seed: impl Into<String>) -> Self {
        Self {
            seed: Some(seed.into()),
            ..Default::default()
        }
    }

    pub fn auto_connect(mut self, enabled: bool) -> Self {
        self.auto_connect = Some(enabled);
        self
    }

    pub fn models(mut self, models: Models) -> Self {
        self.models = Some(models);
        self
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    auto_connect: bool,
    models: Models,
}

impl Resolved {
    fn root() -> Self {
        Self {
            auto_connect: false,
            models: Models::default(),
        }
    }

    fn with(&self, options: &PlanOptions) -> Self {
        Self {
            auto_connect: options.auto_connect.unwrap_or(self.auto_connect),
            models: options.models.clone().unwrap_or_else(|| self.models.clone()),
        }
    }
}

#[derive(Debug, Clone)]
enum Rows {
    Migrations(Children<MigrationScalars>),
    Users(Children<UserInputs>),
    Todos(Children<TodoInputs>),
    Votes(Children<VoteInputs>),
}

#[derive(Debug, Clone)]
enum PlanKind {
    Rows(Rows),
    Pipe(Vec<Plan>),
    Merge(Vec<Plan>),
}

/// A description of rows to generate.
#[derive(Debug, Clone)]
pub struct Plan {
    kind: PlanKind,
    options: PlanOptions,
}

impl Plan {
    fn new(kind: PlanKind) -> Self {
        Self {
            kind,
            options: PlanOptions::default(),
        }
    }

    pub fn migrations(inputs: impl Into<Children<MigrationScalars>>) -> Self {
        Self::new(PlanKind::Rows(Rows::Migrations(inputs.into())))
    }

    pub fn users(inputs: impl Into<Children<UserInputs>>) -> Self {
        Self::new(PlanKind::Rows(Rows::Users(inputs.into())))
    }

    pub fn todos(inputs: impl Into<Children<TodoInputs>>) -> Self {
        Self::new(PlanKind::Rows(Rows::Todos(inputs.into())))
    }

    pub fn votes(inputs: impl Into<Children<VoteInputs>>) -> Self {
        Self::new(PlanKind::Rows(Rows::Votes(inputs.into())))
    }

    /// Runs `plans` one after another, each starting from the store the
    /// previous one produced.
    pub fn pipe(plans: impl IntoIterator<Item = Plan>) -> Self {
        Self::new(PlanKind::Pipe(plans.into_iter().collect()))
    }

    /// Runs every plan against the same starting store and unions the rows
    /// they generate. Serial ids never collide.
    pub fn merge(plans: impl IntoIterator<Item = Plan>) -> Self {
        Self::new(PlanKind::Merge(plans.into_iter().collect()))
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Generates rows on top of `initial`. The input store is left untouched.
    pub fn generate(&self, initial: &Store) -> Result<Store, PlanError> {
        self.generate_at(initial.clone(), 0, None, &Resolved::root())
    }

    fn generate_at(
        &self,
        store: Store,
        index: usize,
        parent_path: Option<&str>,
        inherited: &Resolved,
    ) -> Result<Store, PlanError> {
        let resolved = inherited.with(&self.options);
        let path = match (&self.options.seed, parent_path) {
            (Some(seed), _) => format!("{seed}/{index}"),
            (None, Some(parent)) => format!("{parent}/{index}"),
            (None, None) => format!("{DEFAULT_SEED}/{index}"),
        };

        match &self.kind {
            PlanKind::Pipe(plans) => {
                let mut store = store;
                for (i, plan) in plans.iter().enumerate() {
                    store = plan.generate_at(store, i, Some(&path), &resolved)?;
                }
                Ok(store)
            }
            PlanKind::Merge(plans) => {
                let mut merged = store.clone();
                for (i, plan) in plans.iter().enumerate() {
                    let mut base = store.clone();
                    base.take_sequences_from(&merged);
                    let out = plan.generate_at(base.clone(), i, Some(&path), &resolved)?;
                    merged.absorb_new_rows(&out, &base);
                }
                Ok(merged)
            }
            PlanKind::Rows(rows) => {
                let mut generator = Generator::new(store, path, &resolved);
                generator.run(rows)?;
                Ok(generator.store)
            }
        }
    }
}

struct Generator<'a> {
    store: Store,
    path: String,
    options: &'a Resolved,
    /// Rows generated per table so far; feeds the row seeds.
    counters: [usize; 4],
    /// Round-robin position per table for autoconnect.
    cursors: [usize; 4],
}

fn resolve<T: Clone>(
    input: &Option<ColumnValue<T>>,
    model_seed: &str,
    column: &str,
    fallback: impl FnOnce(&str) -> T,
) -> T {
    let seed = format!("{model_seed}/{column}");
    match input {
        Some(value) => value.resolve(&ColumnContext {
            model_seed: model_seed.to_string(),
            seed,
        }),
        None => fallback(&seed),
    }
}

impl<'a> Generator<'a> {
    fn new(store: Store, path: String, options: &'a Resolved) -> Self {
        Self {
            store,
            path,
            options,
            counters: [0; 4],
            cursors: [0; 4],
        }
    }

    fn run(&mut self, rows: &Rows) -> Result<(), PlanError> {
        match rows {
            Rows::Migrations(inputs) => {
                for scalars in self.expand(Table::Migrations, inputs)? {
                    self.insert_migration(&scalars);
                }
            }
            Rows::Users(inputs) => {
                for user in self.expand(Table::User, inputs)? {
                    self.user_tree(&user)?;
                }
            }
            Rows::Todos(inputs) => {
                for (i, todo) in self.expand(Table::Todo, inputs)?.into_iter().enumerate() {
                    self.todo_tree(&todo, i)?;
                }
            }
            Rows::Votes(inputs) => {
                for (i, vote) in self.expand(Table::Vote, inputs)?.into_iter().enumerate() {
                    let seed = self.next_model_seed(Table::Vote);
                    let todo_id = self.todo_parent(&vote.todo, i, &format!("{seed}/todo"))?;
                    let user_id = self.user_parent(&vote.user, i, &format!("{seed}/user"))?;
                    self.insert_vote(&vote.scalars, seed, todo_id, user_id);
                }
            }
        }
        Ok(())
    }

    fn next_model_seed(&mut self, table: Table) -> String {
        let counter = &mut self.counters[table.index()];
        let seed = format!("{}/{}/{}", self.path, table.name(), counter);
        *counter += 1;
        seed
    }

    fn expand<T: Clone + Default>(
        &self,
        table: Table,
        children: &Children<T>,
    ) -> Result<Vec<T>, PlanError> {
        match children {
            Children::List(items) => Ok(items.clone()),
            Children::Repeat { count, each } => {
                let n = match *count {
                    Count::Exact(n) => n,
                    Count::Between { min, max } if min > max => {
                        return Err(PlanError::InvalidCount { table, min, max });
                    }
                    Count::Between { min, max } => {
                        let seed = format!(
                            "{}/{}/{}/count",
                            self.path,
                            table.name(),
                            self.counters[table.index()]
                        );
                        synth::count(&seed, min, max)
                    }
                };
                Ok((0..n)
                    .map(|i| each.as_ref().map_or_else(T::default, |f| f(i)))
                    .collect())
            }
        }
    }

    // -------------------------
    // Trees
    // -------------------------

    fn user_tree(&mut self, inputs: &UserInputs) -> Result<i32, PlanError> {
        let seed = self.next_model_seed(Table::User);
        let user_id = self.insert_user(&inputs.scalars, seed);

        if let Some(todos) = &inputs.todos {
            for todo in self.expand::<UserTodoInputs>(Table::Todo, todos)? {
                let seed = self.next_model_seed(Table::Todo);
                let todo_id = self.insert_todo(&todo.scalars, seed, user_id);
                if let Some(votes) = &todo.votes {
                    self.todo_votes(votes, todo_id)?;
                }
            }
        }

        if let Some(votes) = &inputs.votes {
            for (i, vote) in self
                .expand::<UserVoteInputs>(Table::Vote, votes)?
                .into_iter()
                .enumerate()
            {
                let seed = self.next_model_seed(Table::Vote);
                let todo_id = self.todo_parent(&vote.todo, i, &format!("{seed}/todo"))?;
                self.insert_vote(&vote.scalars, seed, todo_id, user_id);
            }
        }

        Ok(user_id)
    }

    fn todo_tree(&mut self, inputs: &TodoInputs, index: usize) -> Result<i32, PlanError> {
        let seed = self.next_model_seed(Table::Todo);
        let user_id = self.user_parent(&inputs.user, index, &format!("{seed}/user"))?;
        let todo_id = self.insert_todo(&inputs.scalars, seed, user_id);

        if let Some(votes) = &inputs.votes {
            self.todo_votes(votes, todo_id)?;
        }
        Ok(todo_id)
    }

    fn todo_votes(&mut self, votes: &Children<TodoVoteInputs>, todo_id: i32) -> Result<(), PlanError> {
        for (i, vote) in self.expand(Table::Vote, votes)?.into_iter().enumerate() {
            let seed = self.next_model_seed(Table::Vote);
            let user_id = self.user_parent(&vote.user, i, &format!("{seed}/user"))?;
            self.insert_vote(&vote.scalars, seed, todo_id, user_id);
        }
        Ok(())
    }

    // -------------------------
    // Parents
    // -------------------------

    fn user_parent(
        &mut self,
        parent: &Option<Parent<UserScalars>>,
        index: usize,
        field_seed: &str,
    ) -> Result<i32, PlanError> {
        match parent {
            Some(Parent::Create(scalars)) => {
                let seed = self.next_model_seed(Table::User);
                Ok(self.insert_user(scalars, seed))
            }
            Some(Parent::Connect(f)) => self.connect(Table::User, f, index, field_seed),
            None => {
                let model_connect = self.options.models.user.connect.clone();
                self.implicit_parent(Table::User, model_connect, index, field_seed, |g| {
                    let seed = g.next_model_seed(Table::User);
                    Ok(g.insert_user(&UserScalars::default(), seed))
                })
            }
        }
    }

    fn todo_parent(
        &mut self,
        parent: &Option<Parent<TodoScalars>>,
        index: usize,
        field_seed: &str,
    ) -> Result<i32, PlanError> {
        match parent {
            Some(Parent::Create(scalars)) => self.create_todo_parent(scalars, index),
            Some(Parent::Connect(f)) => self.connect(Table::Todo, f, index, field_seed),
            None => {
                let model_connect = self.options.models.todo.connect.clone();
                self.implicit_parent(Table::Todo, model_connect, index, field_seed, |g| {
                    g.create_todo_parent(&TodoScalars::default(), index)
                })
            }
        }
    }

    fn create_todo_parent(&mut self, scalars: &TodoScalars, index: usize) -> Result<i32, PlanError> {
        let seed = self.next_model_seed(Table::Todo);
        let user_id = self.user_parent(&None, index, &format!("{seed}/user"))?;
        Ok(self.insert_todo(scalars, seed, user_id))
    }

    /// Resolution order for a parent the plan does not mention: the model's
    /// connect callback, then autoconnect, then a freshly created row.
    fn implicit_parent(
        &mut self,
        table: Table,
        model_connect: Option<ConnectFn>,
        index: usize,
        field_seed: &str,
        create: impl FnOnce(&mut Self) -> Result<i32, PlanError>,
    ) -> Result<i32, PlanError> {
        if let Some(f) = model_connect {
            return self.connect(table, &f, index, field_seed);
        }

        if self.options.auto_connect {
            let ids = self.store.ids(table);
            if !ids.is_empty() {
                let cursor = &mut self.cursors[table.index()];
                let id = ids[*cursor % ids.len()];
                *cursor += 1;
                return Ok(id);
            }
        }

        create(self)
    }

    fn connect(
        &self,
        table: Table,
        f: &ConnectFn,
        index: usize,
        field_seed: &str,
    ) -> Result<i32, PlanError> {
        let ctx = ConnectContext {
            index,
            seed: field_seed,
            store: &self.store,
        };
        let id = f(&ctx).ok_or_else(|| PlanError::NothingToConnect {
            table,
            seed: field_seed.to_string(),
        })?;

        if !self.store.ids(table).contains(&id) {
            return Err(PlanError::UnknownParent { table, id });
        }
        Ok(id)
    }

    // -------------------------
    // Rows
    // -------------------------

    fn serial_id(&mut self, table: Table, input: &Option<ColumnValue<i32>>, seed: &str) -> i32 {
        match input {
            Some(value) => {
                let id = value.resolve(&ColumnContext {
                    model_seed: seed.to_string(),
                    seed: format!("{seed}/id"),
                });
                self.store.claim_id(table, id);
                id
            }
            None => self.store.next_id(table),
        }
    }

    fn insert_user(&mut self, inputs: &UserScalars, seed: String) -> i32 {
        let s = inputs.overlay(&self.options.models.user.data);
        let id = self.serial_id(Table::User, &s.id, &seed);

        self.store.user.push(UserRow {
            id,
            name: resolve(&s.name, &seed, "name", synth::full_name),
            email: resolve(&s.email, &seed, "email", |c| synth::email(c, id)),
            password: resolve(&s.password, &seed, "password", synth::password),
            created_at: resolve(&s.created_at, &seed, "created_at", synth::timestamp),
        });
        id
    }

    fn insert_todo(&mut self, inputs: &TodoScalars, seed: String, created_by_id: i32) -> i32 {
        let s = inputs.overlay(&self.options.models.todo.data);
        let id = self.serial_id(Table::Todo, &s.id, &seed);

        self.store.todo.push(TodoRow {
            id,
            text: resolve(&s.text, &seed, "text", synth::todo_text),
            completed: resolve(&s.completed, &seed, "completed", synth::boolean),
            created_at: resolve(&s.created_at, &seed, "created_at", synth::timestamp),
            created_by_id,
        });
        id
    }

    fn insert_vote(&mut self, inputs: &VoteScalars, seed: String, todo_id: i32, created_by_id: i32) -> i32 {
        let s = inputs.overlay(&self.options.models.vote.data);
        let id = self.serial_id(Table::Vote, &s.id, &seed);

        self.store.vote.push(VoteRow {
            id,
            todo_id,
            value: resolve(&s.value, &seed, "value", synth::vote_value),
            created_at: resolve(&s.created_at, &seed, "created_at", synth::timestamp),
            created_by_id,
        });
        id
    }

    fn insert_migration(&mut self, inputs: &MigrationScalars) {
        let s = inputs.overlay(&self.options.models.migrations.data);
        let seed = self.next_model_seed(Table::Migrations);

        let started_at = resolve(&s.started_at, &seed, "started_at", synth::timestamp);
        let migration_name = resolve(&s.migration_name, &seed, "migration_name", |_| {
            format!("{}_init", started_at.format("%Y%m%d%H%M%S"))
        });

        self.store.migrations.push(MigrationRow {
            id: resolve(&s.id, &seed, "id", |c| synth::uuid(c).to_string()),
            checksum: resolve(&s.checksum, &seed, "checksum", synth::checksum),
            finished_at: resolve(&s.finished_at, &seed, "finished_at", |_| {
                Some(started_at + Duration::milliseconds(250))
            }),
            migration_name,
            logs: resolve(&s.logs, &seed, "logs", |_| None),
            rolled_back_at: resolve(&s.rolled_back_at, &seed, "rolled_back_at", |_| None),
            started_at,
            applied_steps_count: resolve(&s.applied_steps_count, &seed, "applied_steps_count", |_| 1),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use todoboard_core::VoteValue;

    use super::*;
    use crate::inputs::*;

    fn unique(ids: Vec<i32>) -> bool {
        let n = ids.len();
        ids.into_iter().collect::<HashSet<_>>().len() == n
    }

    fn users_with_todos() -> Plan {
        Plan::users(Children::x_with(2, |_| UserInputs {
            todos: Some(Children::x_with(3, |_| UserTodoInputs {
                votes: Some(Children::x(1)),
                ..Default::default()
            })),
            ..Default::default()
        }))
    }

    #[test]
    fn same_seed_generates_identical_sql() {
        let plan = users_with_todos().with_options(PlanOptions::seeded("fixed"));
        let a = plan.generate(&Store::new()).unwrap();
        let b = plan.generate(&Store::new()).unwrap();
        assert_eq!(a.to_sql(), b.to_sql());

        let other = users_with_todos()
            .with_options(PlanOptions::seeded("other"))
            .generate(&Store::new())
            .unwrap();
        assert_ne!(a.to_sql(), other.to_sql());
    }

    #[test]
    fn children_reference_their_parents() {
        let store = users_with_todos()
            .with_options(PlanOptions::default().auto_connect(true))
            .generate(&Store::new())
            .unwrap();

        // Voters are connected to existing users instead of created.
        assert_eq!(store.user.len(), 2);
        assert_eq!(store.todo.len(), 6);
        assert_eq!(store.vote.len(), 6);

        let authors: Vec<i32> = store.todo.iter().map(|t| t.created_by_id).collect();
        assert_eq!(authors, vec![1, 1, 1, 2, 2, 2]);

        let todo_ids: HashSet<i32> = store.ids(Table::Todo).into_iter().collect();
        assert!(store.vote.iter().all(|v| todo_ids.contains(&v.todo_id)));
        assert!(store.vote.iter().all(|v| v.created_by_id == 1 || v.created_by_id == 2));
    }

    #[test]
    fn votes_without_autoconnect_create_voters() {
        let plan = Plan::todos(Children::x_with(1, |_| TodoInputs {
            votes: Some(Children::x(2)),
            ..Default::default()
        }));
        let store = plan.generate(&Store::new()).unwrap();

        // One author plus one voter per vote.
        assert_eq!(store.user.len(), 3);
        assert_eq!(store.vote.len(), 2);
        assert!(unique(store.ids(Table::User)));
    }

    #[test]
    fn autoconnect_reuses_existing_rows_round_robin() {
        let plan = Plan::pipe([
            Plan::users(Children::x(2)),
            Plan::todos(Children::x(4)).with_options(PlanOptions::default().auto_connect(true)),
        ]);
        let store = plan.generate(&Store::new()).unwrap();

        assert_eq!(store.user.len(), 2);
        let authors: Vec<i32> = store.todo.iter().map(|t| t.created_by_id).collect();
        assert_eq!(authors, vec![1, 2, 1, 2]);
    }

    #[test]
    fn pipe_threads_the_store_between_plans() {
        let plan = Plan::pipe([
            Plan::users(Children::x(1)),
            Plan::votes(Children::x(3)),
        ])
        .with_options(PlanOptions::seeded("pipe").auto_connect(true));
        let store = plan.generate(&Store::new()).unwrap();

        // The votes need a todo; it is created once, then reused.
        assert_eq!(store.user.len(), 1);
        assert_eq!(store.todo.len(), 1);
        assert!(store.vote.iter().all(|v| v.todo_id == 1 && v.created_by_id == 1));
    }

    #[test]
    fn merge_unions_rows_with_unique_ids() {
        let initial = Plan::users(Children::x(1)).generate(&Store::new()).unwrap();

        let plan = Plan::merge([
            Plan::users(Children::x(2)),
            Plan::todos(Children::x(2)).with_options(PlanOptions::default().auto_connect(true)),
            Plan::users(Children::x(3)),
        ]);
        let store = plan.generate(&initial).unwrap();

        assert_eq!(store.user.len(), 6);
        assert!(unique(store.ids(Table::User)));
        assert_eq!(store.ids(Table::User), vec![1, 2, 3, 4, 5, 6]);
        // The todo plan only sees the initial store, so it connects to user 1.
        assert!(store.todo.iter().all(|t| t.created_by_id == 1));
        // The input store is untouched.
        assert_eq!(initial.user.len(), 1);
    }

    #[test]
    fn explicit_connect_and_unknown_parent() {
        let base = Plan::users(Children::x(2)).generate(&Store::new()).unwrap();

        let plan = Plan::todos(vec![TodoInputs {
            user: Some(Parent::connect(|ctx| ctx.store.user.last().map(|u| u.id))),
            ..Default::default()
        }]);
        let store = plan.generate(&base).unwrap();
        assert_eq!(store.todo[0].created_by_id, 2);

        let plan = Plan::todos(vec![TodoInputs {
            user: Some(Parent::id(99)),
            ..Default::default()
        }]);
        assert_eq!(
            plan.generate(&base).unwrap_err(),
            PlanError::UnknownParent { table: Table::User, id: 99 }
        );

        let plan = Plan::todos(vec![TodoInputs {
            user: Some(Parent::connect(|_| None)),
            ..Default::default()
        }]);
        assert!(matches!(
            plan.generate(&base),
            Err(PlanError::NothingToConnect { table: Table::User, .. })
        ));
    }

    #[test]
    fn range_counts_are_validated() {
        let plan = Plan::users(Children::x(Count::Between { min: 3, max: 1 }));
        assert_eq!(
            plan.generate(&Store::new()).unwrap_err(),
            PlanError::InvalidCount { table: Table::User, min: 3, max: 1 }
        );

        let store = Plan::users(Children::x(2..=4)).generate(&Store::new()).unwrap();
        assert!((2..=4).contains(&store.user.len()));
    }

    #[test]
    fn model_defaults_fill_unset_fields_only() {
        let models = Models {
            user: ModelDefaults {
                data: UserScalars::default().name("Model Name").password("hunter2"),
                connect: None,
            },
            ..Default::default()
        };
        let plan = Plan::users(vec![
            UserInputs::default(),
            UserInputs::from(UserScalars::default().name("Plan Name")),
        ])
        .with_options(PlanOptions::default().models(models));
        let store = plan.generate(&Store::new()).unwrap();

        assert_eq!(store.user[0].name, "Model Name");
        assert_eq!(store.user[1].name, "Plan Name");
        assert!(store.user.iter().all(|u| u.password == "hunter2"));
    }

    fn first_user(ctx: &ConnectContext<'_>) -> Option<i32> {
        ctx.store.user.first().map(|u| u.id)
    }

    #[test]
    fn model_connect_overrides_creation() {
        let base = Plan::users(Children::x(3)).generate(&Store::new()).unwrap();
        let models = Models {
            user: ModelDefaults {
                data: UserScalars::default(),
                connect: Some(Arc::new(first_user)),
            },
            ..Default::default()
        };
        let store = Plan::todos(Children::x(2))
            .with_options(PlanOptions::default().models(models))
            .generate(&base)
            .unwrap();

        assert_eq!(store.user.len(), 3);
        assert!(store.todo.iter().all(|t| t.created_by_id == 1));
    }

    #[test]
    fn column_callbacks_receive_seed_paths() {
        let plan = Plan::todos(vec![TodoInputs::from(
            TodoScalars::default().text(ColumnValue::with(|c: &ColumnContext| c.seed.clone())),
        )])
        .with_options(PlanOptions::seeded("s"));
        let store = plan.generate(&Store::new()).unwrap();

        assert_eq!(store.todo[0].text, "s/0/todo/0/text");
    }

    #[test]
    fn fixed_ids_advance_the_sequence() {
        let plan = Plan::users(vec![
            UserInputs::from(UserScalars::default().id(10)),
            UserInputs::default(),
        ]);
        let store = plan.generate(&Store::new()).unwrap();
        assert_eq!(store.ids(Table::User), vec![10, 11]);
    }

    #[test]
    fn generates_over_external_rows_without_reinserting_them() {
        let existing = Plan::users(Children::x(1)).generate(&Store::new()).unwrap();
        let initial = Store::external(existing);

        let store = Plan::votes(vec![VoteInputs::from(
            VoteScalars::default().value(VoteValue::Downvote),
        )])
        .with_options(PlanOptions::default().auto_connect(true))
        .generate(&initial)
        .unwrap();

        let sql = store.to_sql();
        // A todo (authored by the external user) and the vote; no user insert.
        assert_eq!(sql.len(), 2);
        assert!(sql[0].starts_with("INSERT INTO todo"));
        assert!(sql[1].contains("'DOWNVOTE'"));
        assert_eq!(store.vote[0].created_by_id, 1);
    }

    #[test]
    fn migration_rows_are_complete() {
        let store = Plan::migrations(Children::x(2)).generate(&Store::new()).unwrap();
        assert_eq!(store.migrations.len(), 2);
        for m in &store.migrations {
            assert_eq!(m.checksum.len(), 64);
            assert!(m.finished_at.unwrap() > m.started_at);
            assert!(m.migration_name.ends_with("_init"));
            assert_eq!(m.applied_steps_count, 1);
        }
        assert_ne!(store.migrations[0].id, store.migrations[1].id);
    }
}
