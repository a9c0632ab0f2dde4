use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{AppUser, NewAppUser, Role, RoleRecord, Task, TaskStatus, User};
use crate::store::{CredentialStore, NewTask, TaskPatch, TaskStore};

/// `CredentialStore` backed by the `app_users` and `roles` tables.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AppUser>, AppError> {
        let user = sqlx::query_as::<_, AppUser>(
            "SELECT u.id, u.username, u.password_hash, r.name AS role \
             FROM app_users u JOIN roles r ON r.id = u.role_id \
             WHERE u.username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_role(&self, role: Role) -> Result<Option<RoleRecord>, AppError> {
        let record = sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles WHERE name = $1")
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn save_user(&self, user: NewAppUser) -> Result<(), AppError> {
        sqlx::query("INSERT INTO app_users (username, password_hash, role_id) VALUES ($1, $2, $3)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// Base projection for task reads: the row plus the display fields of the
// user and status rows it references.
const SELECT_TASK: &str = "SELECT t.id, t.title, t.description, t.limit_date, \
     t.user_id, u.name AS user_name, t.status_id, s.description AS status_description \
     FROM tasks t \
     JOIN users u ON u.id = t.user_id \
     JOIN task_statuses s ON s.id = t.status_id";

/// `TaskStore` backed by the `tasks`, `users` and `task_statuses` tables.
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!("{} WHERE t.id = $1", SELECT_TASK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        self.fetch_task(id).await
    }

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!("{} ORDER BY t.id", SELECT_TASK))
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    async fn create(&self, new_task: NewTask) -> Result<Task, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tasks (title, description, limit_date, user_id, status_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.limit_date)
        .bind(new_task.user_id)
        .bind(new_task.status_id)
        .fetch_one(&self.pool)
        .await?;

        let task = sqlx::query_as::<_, Task>(&format!("{} WHERE t.id = $1", SELECT_TASK))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(task)
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Option<Task>, AppError> {
        let result = sqlx::query(
            "UPDATE tasks SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             limit_date = COALESCE($4, limit_date), \
             user_id = COALESCE($5, user_id), \
             status_id = COALESCE($6, status_id) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.limit_date)
        .bind(patch.user_id)
        .bind(patch.status_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_task(id).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_status_by_id(&self, id: i64) -> Result<Option<TaskStatus>, AppError> {
        let status = sqlx::query_as::<_, TaskStatus>(
            "SELECT id, description FROM task_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(status)
    }
}
