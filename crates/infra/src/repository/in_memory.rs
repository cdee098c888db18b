use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use todoboard_core::{Entity, NewTodo, Todo, TodoFilter, TodoId, TodoPatch};

use super::{RepositoryError, RepositoryResult, TodoRepository};

#[derive(Debug)]
struct State {
    rows: BTreeMap<TodoId, Todo>,
    /// Last id handed out. Like a database sequence, it never goes backwards,
    /// even after rows are deleted.
    last_id: i32,
}

/// In-memory todo store for tests/dev.
#[derive(Debug)]
pub struct InMemoryTodoRepository {
    inner: RwLock<State>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(State {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn find_many(&self, filter: TodoFilter) -> RepositoryResult<Vec<Todo>> {
        let state = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(state
            .rows
            .values()
            .rev()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewTodo) -> RepositoryResult<Todo> {
        let mut state = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        state.last_id += 1;

        let todo = Todo {
            id: TodoId::new(state.last_id),
            text: new.text,
            completed: new.completed.unwrap_or(false),
            created_at: Utc::now(),
            created_by_id: new.created_by_id,
        };
        state.rows.insert(todo.id(), todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryResult<Todo> {
        let mut state = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let todo = state.rows.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        patch.apply(todo);
        Ok(todo.clone())
    }

    async fn delete(&self, id: TodoId) -> RepositoryResult<Todo> {
        let mut state = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        state.rows.remove(&id).ok_or(RepositoryError::NotFound(id))
    }

    async fn delete_many(&self) -> RepositoryResult<u64> {
        let mut state = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let removed = state.rows.len() as u64;
        state.rows.clear();
        Ok(removed)
    }
}
