use crate::task::TaskState;
use crate::task::api::v1::{self, CreateTaskRequest, DeleteTaskResponse, TaskJson, UpdateTaskRequest};
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable description of the error
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        v1::list_tasks_handler,
        v1::create_task_handler,
        v1::read_task_handler,
        v1::update_task_handler,
        v1::delete_task_handler,
    ),
    components(schemas(
        TaskJson,
        CreateTaskRequest,
        UpdateTaskRequest,
        DeleteTaskResponse,
        ErrorResponse
    )),
    tags((name = "Tasks", description = "Todo task management"))
)]
pub struct ApiDoc;

/// Serves the OpenAPI document for the task API.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the JSON API routes: the task resource plus its OpenAPI document.
pub fn create_api_router(task_state: TaskState) -> Router {
    v1::create_api_router(task_state).route("/api-docs/openapi.json", get(openapi_handler))
}
