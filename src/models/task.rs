use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A task status record (e.g. "Pending", "In Progress", "Completed").
/// Statuses live in their own table; tasks reference them by id.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct TaskStatus {
    pub id: i64,
    pub description: String,
}

/// Represents a task as returned by the API: the row itself plus the display
/// fields of its owning user and status.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// The deadline for the task.
    pub limit_date: NaiveDate,
    /// Identifier of the user who owns the task.
    pub user_id: i64,
    pub user_name: String,
    /// Identifier of the task's status record.
    pub status_id: i64,
    pub status_description: String,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskCreationRequest {
    /// Must be between 5 and 30 characters.
    #[validate(length(min = 5, max = 30, message = "Title must be between 5 and 30 characters"))]
    pub title: String,

    /// Must be between 10 and 60 characters.
    #[validate(length(
        min = 10,
        max = 60,
        message = "Description must be between 10 and 60 characters"
    ))]
    pub description: String,

    /// Must be today or in the future.
    #[validate(custom = "validate_limit_date")]
    pub limit_date: NaiveDate,

    /// The id of the user the task belongs to.
    pub user_id: i64,

    /// The id of the status record the task starts in.
    pub status_id: i64,
}

/// Input structure for updating a task. Every field is optional; absent
/// fields leave the stored value untouched.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct TaskUpdateRequest {
    #[validate(length(min = 5, max = 30, message = "Title must be between 5 and 30 characters"))]
    pub title: Option<String>,

    #[validate(length(
        min = 10,
        max = 60,
        message = "Description must be between 10 and 60 characters"
    ))]
    pub description: Option<String>,

    #[validate(custom = "validate_limit_date")]
    pub limit_date: Option<NaiveDate>,

    pub user_id: Option<i64>,

    pub status_id: Option<i64>,
}

fn validate_limit_date(limit_date: &NaiveDate) -> Result<(), ValidationError> {
    if *limit_date < Utc::now().date_naive() {
        let mut error = ValidationError::new("limit_date_in_past");
        error.message = Some("Limit Date must be today or in the future".into());
        return Err(error);
    }
    Ok(())
}
