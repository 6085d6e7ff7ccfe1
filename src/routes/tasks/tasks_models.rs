use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::TaskFields;

// Body of POST /tasks and PUT /tasks/{id}
#[derive(Deserialize)]
pub struct TaskRequest {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl TaskRequest {
    pub fn into_fields(self) -> Result<TaskFields, &'static str> {
        if self.title.is_empty() {
            return Err("title must not be empty");
        }
        if self.description.is_empty() {
            return Err("description must not be empty");
        }
        let due_date = DateTime::parse_from_rfc3339(&self.due_date)
            .map_err(|_| "due_date must be an RFC 3339 date-time")?
            .with_timezone(&Utc);

        Ok(TaskFields {
            title: self.title,
            description: self.description,
            due_date,
        })
    }
}

// Error body for every non-2xx answer
#[derive(Serialize)]
pub struct TaskErrorResponse {
    pub success: bool,
    pub message: String,
}

impl TaskErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        TaskErrorResponse {
            success: false,
            message: message.into(),
        }
    }
}

/// Task ids in paths are positive integers; anything else is a bad request.
pub fn parse_task_id(raw: &str) -> Result<i64, &'static str> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err("task id must be a positive integer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(title: &str, description: &str, due_date: &str) -> TaskRequest {
        TaskRequest {
            title: title.to_string(),
            description: description.to_string(),
            due_date: due_date.to_string(),
        }
    }

    #[test]
    fn valid_request_becomes_fields_in_utc() {
        let fields = request("A", "B", "2025-01-01T03:00:00+03:00").into_fields().unwrap();
        assert_eq!(fields.title, "A");
        assert_eq!(fields.description, "B");
        assert_eq!(fields.due_date, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn empty_text_fields_are_rejected() {
        assert!(request("", "B", "2025-01-01T00:00:00Z").into_fields().is_err());
        assert!(request("A", "", "2025-01-01T00:00:00Z").into_fields().is_err());
    }

    #[test]
    fn ambiguous_due_dates_are_rejected() {
        for due_date in ["", "2025-01-01", "2025-01-01 00:00:00", "2025-01-01T00:00:00", "tomorrow"] {
            assert!(request("A", "B", due_date).into_fields().is_err(), "accepted {due_date:?}");
        }
    }

    #[test]
    fn task_ids_must_be_positive_integers() {
        assert_eq!(parse_task_id("1"), Ok(1));
        assert_eq!(parse_task_id("9000"), Ok(9000));
        for raw in ["0", "-3", "abc", "1.5", ""] {
            assert!(parse_task_id(raw).is_err(), "accepted {raw:?}");
        }
    }
}
