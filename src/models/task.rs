use chrono::{DateTime, Utc};
use serde::Serialize;

/// A row of the `tasks` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Caller-supplied fields, already validated by the request layer
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}
