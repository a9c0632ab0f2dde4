//! In-memory implementations of the persistence ports.
//!
//! These back the integration test suite, which drives the full HTTP surface
//! without a running database. They are also handy for local experimentation.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{AppUser, NewAppUser, Role, RoleRecord, Task, TaskStatus, User};
use crate::store::{CredentialStore, NewTask, TaskPatch, TaskStore};

/// `CredentialStore` over a process-local map.
pub struct MemoryCredentialStore {
    users: RwLock<Vec<AppUser>>,
    roles: Vec<RoleRecord>,
    next_id: AtomicI64,
}

impl MemoryCredentialStore {
    /// A store with both roles configured, the normal deployment shape.
    pub fn new() -> Self {
        Self::with_roles(vec![
            RoleRecord {
                id: 1,
                name: Role::User,
            },
            RoleRecord {
                id: 2,
                name: Role::Admin,
            },
        ])
    }

    /// A store with an explicit role configuration. Passing fewer roles than
    /// the enum defines reproduces the "valid role, no backing record" case.
    pub fn with_roles(roles: Vec<RoleRecord>) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            roles,
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AppUser>, AppError> {
        let users = self.users.read().expect("credential store lock poisoned");
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let users = self.users.read().expect("credential store lock poisoned");
        Ok(users.iter().any(|u| u.username == username))
    }

    async fn find_role(&self, role: Role) -> Result<Option<RoleRecord>, AppError> {
        Ok(self.roles.iter().find(|r| r.name == role).cloned())
    }

    async fn save_user(&self, user: NewAppUser) -> Result<(), AppError> {
        let role = self
            .roles
            .iter()
            .find(|r| r.id == user.role_id)
            .ok_or_else(|| AppError::DatabaseError(format!("no role with id {}", user.role_id)))?;

        let mut users = self.users.write().expect("credential store lock poisoned");
        users.push(AppUser {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: user.username,
            password_hash: user.password_hash,
            role: role.name,
        });
        Ok(())
    }
}

/// `TaskStore` over process-local maps, with seeding helpers for the
/// referenced user and status records.
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
    users: RwLock<Vec<User>>,
    statuses: RwLock<Vec<TaskStatus>>,
    next_task_id: AtomicI64,
    next_user_id: AtomicI64,
    next_status_id: AtomicI64,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
            users: RwLock::new(Vec::new()),
            statuses: RwLock::new(Vec::new()),
            next_task_id: AtomicI64::new(1),
            next_user_id: AtomicI64::new(1),
            next_status_id: AtomicI64::new(1),
        }
    }

    /// Inserts a task-owning user and returns its id.
    pub fn seed_user(&self, name: &str, email: &str) -> i64 {
        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().expect("task store lock poisoned");
        users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
        });
        id
    }

    /// Inserts a status record and returns its id.
    pub fn seed_status(&self, description: &str) -> i64 {
        let id = self.next_status_id.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.write().expect("task store lock poisoned");
        statuses.push(TaskStatus {
            id,
            description: description.to_string(),
        });
        id
    }

    fn display_fields(&self, user_id: i64, status_id: i64) -> Option<(String, String)> {
        let users = self.users.read().expect("task store lock poisoned");
        let statuses = self.statuses.read().expect("task store lock poisoned");
        let user_name = users.iter().find(|u| u.id == user_id)?.name.clone();
        let status_description = statuses
            .iter()
            .find(|s| s.id == status_id)?
            .description
            .clone();
        Some((user_name, status_description))
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().expect("task store lock poisoned");
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().expect("task store lock poisoned");
        Ok(tasks.clone())
    }

    async fn create(&self, new_task: NewTask) -> Result<Task, AppError> {
        let (user_name, status_description) = self
            .display_fields(new_task.user_id, new_task.status_id)
            .ok_or_else(|| {
                AppError::DatabaseError("task references a missing user or status".into())
            })?;

        let task = Task {
            id: self.next_task_id.fetch_add(1, Ordering::SeqCst),
            title: new_task.title,
            description: new_task.description,
            limit_date: new_task.limit_date,
            user_id: new_task.user_id,
            user_name,
            status_id: new_task.status_id,
            status_description,
        };

        let mut tasks = self.tasks.write().expect("task store lock poisoned");
        tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Option<Task>, AppError> {
        let current = {
            let tasks = self.tasks.read().expect("task store lock poisoned");
            match tasks.iter().find(|t| t.id == id) {
                Some(task) => task.clone(),
                None => return Ok(None),
            }
        };

        let user_id = patch.user_id.unwrap_or(current.user_id);
        let status_id = patch.status_id.unwrap_or(current.status_id);
        let (user_name, status_description) =
            self.display_fields(user_id, status_id).ok_or_else(|| {
                AppError::DatabaseError("task references a missing user or status".into())
            })?;

        let updated = Task {
            id,
            title: patch.title.unwrap_or(current.title),
            description: patch.description.unwrap_or(current.description),
            limit_date: patch.limit_date.unwrap_or(current.limit_date),
            user_id,
            user_name,
            status_id,
            status_description,
        };

        let mut tasks = self.tasks.write().expect("task store lock poisoned");
        if let Some(slot) = tasks.iter_mut().find(|t| t.id == id) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().expect("task store lock poisoned");
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let users = self.users.read().expect("task store lock poisoned");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_status_by_id(&self, id: i64) -> Result<Option<TaskStatus>, AppError> {
        let statuses = self.statuses.read().expect("task store lock poisoned");
        Ok(statuses.iter().find(|s| s.id == id).cloned())
    }
}
