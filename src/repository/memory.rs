use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{now, RepositoryError, TaskStore};
use crate::models::task::{Task, TaskFields};

// Stand-in for PgTaskRepository in handler tests
#[derive(Default)]
pub struct InMemoryTaskStore {
    state: Mutex<State>,
    failing: bool,
}

#[derive(Default)]
struct State {
    next_id: i64,
    tasks: BTreeMap<i64, Task>,
}

impl InMemoryTaskStore {
    /// A store whose every call fails as if the database were unreachable.
    pub fn failing() -> Self {
        InMemoryTaskStore {
            failing: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing {
            return Err(RepositoryError::Backend(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, fields: &TaskFields) -> Result<Task, RepositoryError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let at = now();
        let task = Task {
            id: state.next_id,
            title: fields.title.clone(),
            description: fields.description.clone(),
            due_date: fields.due_date,
            created_at: at,
            updated_at: at,
        };
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_all(&self) -> Result<Vec<Task>, RepositoryError> {
        self.check()?;
        Ok(self.state.lock().unwrap().tasks.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Task, RepositoryError> {
        self.check()?;
        self.state
            .lock()
            .unwrap()
            .tasks
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn update(&self, id: i64, fields: &TaskFields) -> Result<Task, RepositoryError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let task = state.tasks.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        task.title = fields.title.clone();
        task.description = fields.description.clone();
        task.due_date = fields.due_date;
        task.updated_at = now().max(task.updated_at);
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.check()?;
        self.state
            .lock()
            .unwrap()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}
