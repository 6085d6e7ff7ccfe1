use async_trait::async_trait;
use sqlx::PgPool;

use super::{now, RepositoryError, TaskStore};
use crate::models::task::{Task, TaskFields};

/// [`TaskStore`] backed by the `tasks` table.
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        PgTaskRepository { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskRepository {
    async fn create(&self, fields: &TaskFields) -> Result<Task, RepositoryError> {
        let created_at = now();
        let task = sqlx::query_as::<_, Task>(
            "
            INSERT INTO tasks (title, description, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, title, description, due_date, created_at, updated_at
            ",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.due_date)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_all(&self) -> Result<Vec<Task>, RepositoryError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, due_date, created_at, updated_at FROM tasks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn get_by_id(&self, id: i64) -> Result<Task, RepositoryError> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, description, due_date, created_at, updated_at FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound(id))
    }

    async fn update(&self, id: i64, fields: &TaskFields) -> Result<Task, RepositoryError> {
        // GREATEST keeps updated_at from moving backwards if the clock does.
        sqlx::query_as::<_, Task>(
            "
            UPDATE tasks
            SET title = $1, description = $2, due_date = $3, updated_at = GREATEST($4, updated_at)
            WHERE id = $5
            RETURNING id, title, description, due_date, created_at, updated_at
            ",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.due_date)
        .bind(now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}
