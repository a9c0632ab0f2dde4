use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{TaskCreationRequest, TaskUpdateRequest},
    store::{NewTask, TaskPatch, TaskStore},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves a single task by its id.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` object as JSON.
/// - `401 Unauthorized`: If no authenticated identity is attached.
/// - `404 Not Found`: If no task with the given id exists.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<i64>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();

    let task = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task with id {} was not found", id)))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Retrieves every task in the store.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If no authenticated identity is attached.
/// - `404 Not Found`: When the store holds no tasks at all.
#[get("")]
pub async fn get_tasks(
    store: web::Data<dyn TaskStore>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = store.list().await?;

    if tasks.is_empty() {
        return Err(AppError::NotFound("No tasks were found".into()));
    }

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task.
///
/// The owning user and the status are referenced by id and must already
/// exist.
///
/// ## Request Body:
/// A JSON object matching `TaskCreationRequest`:
/// - `title`: 5 to 30 characters.
/// - `description`: 10 to 60 characters.
/// - `limit_date`: deadline, today or later.
/// - `user_id`: id of the owning user.
/// - `status_id`: id of the initial status record.
///
/// ## Responses:
/// - `201 Created`: Returns the created `Task` object as JSON.
/// - `400 Bad Request`: If input validation fails.
/// - `401 Unauthorized`: If no authenticated identity is attached.
/// - `404 Not Found`: If the referenced user or status does not exist.
#[post("")]
pub async fn create_task(
    store: web::Data<dyn TaskStore>,
    task_data: web::Json<TaskCreationRequest>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let task_data = task_data.into_inner();

    store
        .find_user_by_id(task_data.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("User with id {} was not found", task_data.user_id))
        })?;

    store
        .find_status_by_id(task_data.status_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Task status with id {} was not found",
                task_data.status_id
            ))
        })?;

    let task = store
        .create(NewTask {
            title: task_data.title,
            description: task_data.description,
            limit_date: task_data.limit_date,
            user_id: task_data.user_id,
            status_id: task_data.status_id,
        })
        .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Updates an existing task.
///
/// Partial update: only the fields present in the body change. When
/// `user_id` or `status_id` are provided, the referenced records must exist.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `400 Bad Request`: If input validation fails.
/// - `401 Unauthorized`: If no authenticated identity is attached.
/// - `404 Not Found`: If the task, the new user, or the new status does not exist.
#[put("/{id}")]
pub async fn update_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskUpdateRequest>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let id = task_id.into_inner();
    let task_data = task_data.into_inner();

    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task with id {} was not found", id)))?;

    if let Some(user_id) = task_data.user_id {
        store.find_user_by_id(user_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("User with id {} was not found", user_id))
        })?;
    }

    if let Some(status_id) = task_data.status_id {
        store.find_status_by_id(status_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Task status with id {} was not found", status_id))
        })?;
    }

    let updated = store
        .update(
            id,
            TaskPatch {
                title: task_data.title,
                description: task_data.description,
                limit_date: task_data.limit_date,
                user_id: task_data.user_id,
                status_id: task_data.status_id,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task with id {} was not found", id)))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task by its id.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `401 Unauthorized`: If no authenticated identity is attached.
/// - `404 Not Found`: If no task with the given id exists.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<i64>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();

    if !store.delete_by_id(id).await? {
        return Err(AppError::NotFound(format!(
            "Task with id {} was not found",
            id
        )));
    }

    Ok(HttpResponse::NoContent().finish())
}
