// src/repository/mod.rs

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use crate::models::task::{Task, TaskFields};

pub mod task_repository;

#[cfg(test)]
pub mod memory;

pub use task_repository::PgTaskRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row with this id. A normal negative answer, not a failure.
    #[error("no task with id {0}")]
    NotFound(i64),
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Data access for tasks.
///
/// Every method is a single statement; implementations keep no state besides
/// their connection handle and are shared across concurrent requests.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, fields: &TaskFields) -> Result<Task, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<Task>, RepositoryError>;

    async fn get_by_id(&self, id: i64) -> Result<Task, RepositoryError>;

    /// Replaces the caller-supplied fields and refreshes `updated_at`.
    async fn update(&self, id: i64, fields: &TaskFields) -> Result<Task, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}

// PostgreSQL keeps microseconds; truncating here makes a created task equal its read-back.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
