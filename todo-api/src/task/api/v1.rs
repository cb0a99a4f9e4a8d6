use crate::task::{DEFAULT_STATUS, NewTask, Task, TaskChanges, TaskRepositoryError, TaskState};
use crate::web::api::ErrorResponse;
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    /// Unique identifier assigned by the server
    pub id: Uuid,
    /// Label of the task
    pub name: String,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
    /// Free-form status label
    pub status: String,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            name: task.name().to_string(),
            created_at: task.created_at().timestamp_millis(),
            status: task.status().to_string(),
        }
    }
}

/// Request body for POST /tasks.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Label of the task, must be non-empty
    name: Option<String>,
    /// Status label, defaults to "pending"
    status: Option<String>,
}

impl CreateTaskRequest {
    /// Validates the request into a task ready to be stored.
    pub fn into_new_task(self) -> Result<NewTask, TaskApiError> {
        let name = match self.name {
            Some(name) if is_blank(&name) => {
                return Err(TaskApiError::Validation("name must not be empty".to_string()));
            }
            Some(name) => name,
            None => return Err(TaskApiError::Validation("name is required".to_string())),
        };
        let status = match self.status {
            Some(status) if is_blank(&status) => {
                return Err(TaskApiError::Validation(
                    "status must not be empty".to_string(),
                ));
            }
            Some(status) => status,
            None => DEFAULT_STATUS.to_string(),
        };
        Ok(NewTask { name, status })
    }
}

/// Request body for PUT /tasks/{id}.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// New label of the task
    name: Option<String>,
    /// New status label
    status: Option<String>,
}

impl UpdateTaskRequest {
    /// Validates the request into the set of field changes to apply.
    pub fn into_changes(self) -> Result<TaskChanges, TaskApiError> {
        if self.name.as_deref().is_some_and(is_blank) {
            return Err(TaskApiError::Validation("name must not be empty".to_string()));
        }
        if self.status.as_deref().is_some_and(is_blank) {
            return Err(TaskApiError::Validation(
                "status must not be empty".to_string(),
            ));
        }
        let changes = TaskChanges {
            name: self.name,
            status: self.status,
        };
        if changes.is_empty() {
            return Err(TaskApiError::Validation(
                "at least one of name or status is required".to_string(),
            ));
        }
        Ok(changes)
    }
}

/// Response body for DELETE /tasks/{id}.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteTaskResponse {
    pub message: String,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Parses a path identifier. Anything that is not a UUID cannot name a stored task.
fn parse_task_id(id: &str) -> Result<Uuid, TaskApiError> {
    Uuid::parse_str(id).map_err(|_| TaskApiError::NotFound(id.to_string()))
}

/// Custom error type for task API handlers.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// The request body is malformed or missing required fields.
    #[error("{0}")]
    Validation(String),
    /// No task exists with the given ID.
    #[error("Task with ID {0} not found")]
    NotFound(String),
    /// The ID path segment could not be read, so it cannot name a task.
    #[error("Task ID could not be read from the path: {0}")]
    UnreadableId(String),
    /// The storage layer failed.
    #[error("Storage error: {0}")]
    Storage(#[from] TaskRepositoryError),
}

impl From<JsonRejection> for TaskApiError {
    fn from(rejection: JsonRejection) -> Self {
        TaskApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for TaskApiError {
    fn from(rejection: PathRejection) -> Self {
        TaskApiError::UnreadableId(rejection.body_text())
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let (status_code, error) = match &self {
            TaskApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            TaskApiError::NotFound(_) | TaskApiError::UnreadableId(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            TaskApiError::Storage(err) => {
                tracing::error!("Task storage failure: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
        };
        let message = match self {
            TaskApiError::Storage(_) => "An unexpected error occurred while processing your request. Please try again later.".to_string(),
            other => other.to_string(),
        };

        (
            status_code,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Handler for GET /tasks - Returns all tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = [TaskJson]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<TaskState>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let tasks = state.repository.find_all().await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for POST /tasks - Creates a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskJson),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<TaskState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Json(request) = payload?;
    let new_task = request.into_new_task()?;
    let task = state.repository.insert(new_task).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(
        ("id" = String, Path, description = "ID of the task")
    ),
    responses(
        (status = 200, description = "Task found", body = TaskJson),
        (status = 404, description = "No task with this ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn read_task_handler(
    State(state): State<TaskState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(id) = path?;
    let task_id = parse_task_id(&id)?;
    let task = state
        .repository
        .find_by_id(task_id)
        .await?
        .ok_or(TaskApiError::NotFound(id))?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PUT /tasks/{id} - Replaces the supplied fields of a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(
        ("id" = String, Path, description = "ID of the task")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "No task with this ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<TaskState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(id) = path?;
    let task_id = parse_task_id(&id)?;
    let Json(request) = payload?;
    let changes = request.into_changes()?;
    let task = state
        .repository
        .update_by_id(task_id, changes)
        .await?
        .ok_or(TaskApiError::NotFound(id))?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /tasks/{id} - Deletes a task. Deleting a missing task succeeds.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(
        ("id" = String, Path, description = "ID of the task")
    ),
    responses(
        (status = 200, description = "Task deleted or already absent", body = DeleteTaskResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<TaskState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteTaskResponse>, TaskApiError> {
    let task_id = match path {
        Ok(Path(id)) => Uuid::parse_str(&id)
            .inspect_err(|_| tracing::debug!("Ignoring delete for malformed task ID {}", id))
            .ok(),
        Err(rejection) => {
            tracing::debug!("Ignoring delete for unreadable task ID: {}", rejection);
            None
        }
    };
    if let Some(task_id) = task_id {
        if !state.repository.delete_by_id(task_id).await? {
            tracing::debug!("Task {} was already absent", task_id);
        }
    }
    Ok(Json(DeleteTaskResponse {
        message: "Task successfully deleted".to_string(),
    }))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: TaskState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(read_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
