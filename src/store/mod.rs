//!
//! # Persistence Ports
//!
//! The rest of the application talks to storage through the two traits in
//! this module. `store::postgres` implements them over a `sqlx` Postgres
//! pool; `store::memory` implements them over in-process maps for tests and
//! local experimentation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{AppUser, NewAppUser, Role, RoleRecord, Task, TaskStatus, User};

/// Lookup and creation of credential records and their role configuration.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AppUser>, AppError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;

    /// The configured record backing a role enum value, if any.
    async fn find_role(&self, role: Role) -> Result<Option<RoleRecord>, AppError>;

    async fn save_user(&self, user: NewAppUser) -> Result<(), AppError>;
}

/// Fields for a task to be created. Referential checks (does the user exist,
/// does the status exist) happen in the handlers, before this is persisted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub limit_date: NaiveDate,
    pub user_id: i64,
    pub status_id: i64,
}

/// A partial update to a task. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub limit_date: Option<NaiveDate>,
    pub user_id: Option<i64>,
    pub status_id: Option<i64>,
}

/// Task persistence plus the lookups of the records tasks reference.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError>;

    async fn list(&self) -> Result<Vec<Task>, AppError>;

    async fn create(&self, new_task: NewTask) -> Result<Task, AppError>;

    /// Applies the patch to an existing task. Returns `None` when no task
    /// with that id exists.
    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Option<Task>, AppError>;

    /// Returns whether a task was actually deleted.
    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_status_by_id(&self, id: i64) -> Result<Option<TaskStatus>, AppError>;
}
