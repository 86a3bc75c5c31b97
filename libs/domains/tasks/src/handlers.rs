use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    routing::get,
};
use axum_helpers::errors::{handlers::method_not_allowed, responses::InternalServerErrorResponse};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{StoreFault, TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskSearch, UpdateTask};
use crate::repository::TaskRepository;
use crate::service::TaskService;

/// Body returned by a single delete
pub const TASK_DELETED: &str = "Task deleted";

/// Body returned by a per-user bulk delete
pub const TASKS_DELETED: &str = "Tasks deleted";

/// OpenAPI documentation for Tasks API
#[derive(OpenApi)]
#[openapi(
    paths(
        search_tasks,
        list_tasks,
        create_task,
        get_task,
        update_task,
        delete_task,
        list_user_tasks,
        delete_user_tasks,
    ),
    components(
        schemas(Task, CreateTask, UpdateTask),
        responses(InternalServerErrorResponse)
    ),
    tags(
        (name = "Tasks", description = "Task management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the tasks router with all HTTP endpoints
pub fn router<R: TaskRepository + 'static>(service: TaskService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/search", get(search_tasks))
        .route(
            "/{task_id}",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .route(
            "/user/{user_id}",
            get(list_user_tasks).delete(delete_user_tasks),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(shared_service)
}

/// Search tasks by name and finished status.
///
/// An unreadable query string or a repeated parameter adds no constraint.
#[utoipa::path(
    get,
    path = "/search",
    tag = "Tasks",
    params(TaskSearch),
    responses(
        (status = 200, description = "Matching tasks", body = Vec<Task>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> TaskResult<Json<Vec<Task>>> {
    let search = match query {
        Ok(Query(pairs)) => TaskSearch::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Ignoring unreadable search query");
            TaskSearch::default()
        }
    };
    let tasks = service.search(search).await?;
    Ok(Json(tasks))
}

/// List every task
#[utoipa::path(
    get,
    path = "",
    tag = "Tasks",
    responses(
        (status = 200, description = "All tasks", body = Vec<Task>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
) -> TaskResult<Json<Vec<Task>>> {
    let tasks = service.list_all().await?;
    Ok(Json(tasks))
}

/// Create a task
#[utoipa::path(
    post,
    path = "",
    tag = "Tasks",
    request_body = CreateTask,
    responses(
        (status = 200, description = "Task created", body = Task),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> TaskResult<Json<Task>> {
    let Json(input) = payload.map_err(|e| TaskError::Creation(invalid_payload(e)))?;
    let task = service.create(input).await?;
    Ok(Json(task))
}

/// Get a task by ID; `null` when it does not exist
#[utoipa::path(
    get,
    path = "/{task_id}",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "The task, or null", body = Option<Task>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    task_id: Result<Path<String>, PathRejection>,
) -> TaskResult<Json<Option<Task>>> {
    let Path(task_id) = task_id.map_err(|e| TaskError::Retrieval(invalid_id(e)))?;
    let task = service.get(&task_id).await?;
    Ok(Json(task))
}

/// Partially update a task and return its new state
#[utoipa::path(
    method(put, patch),
    path = "/{task_id}",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task ID (24 hex characters)")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "The updated task, or null", body = Option<Task>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    task_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> TaskResult<Json<Option<Task>>> {
    let Path(task_id) = task_id.map_err(|e| TaskError::Update(invalid_id(e)))?;
    let Json(input) = payload.map_err(|e| TaskError::Update(invalid_payload(e)))?;
    let task = service.update(&task_id, input).await?;
    Ok(Json(task))
}

/// Delete a task; deleting a missing task also succeeds
#[utoipa::path(
    delete,
    path = "/{task_id}",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Confirmation", body = String),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    task_id: Result<Path<String>, PathRejection>,
) -> TaskResult<Json<&'static str>> {
    let Path(task_id) = task_id.map_err(|e| TaskError::Deletion(invalid_id(e)))?;
    service.delete(&task_id).await?;
    Ok(Json(TASK_DELETED))
}

/// List the tasks owned by a user
#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Tasks",
    params(
        ("user_id" = String, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "The user's tasks", body = Vec<Task>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_user_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    user_id: Result<Path<String>, PathRejection>,
) -> TaskResult<Json<Vec<Task>>> {
    let Path(user_id) = user_id.map_err(|e| TaskError::Retrieval(invalid_id(e)))?;
    let tasks = service.list_by_user(user_id).await?;
    Ok(Json(tasks))
}

/// Delete every task owned by a user
#[utoipa::path(
    delete,
    path = "/user/{user_id}",
    tag = "Tasks",
    params(
        ("user_id" = String, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "Confirmation", body = String),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    user_id: Result<Path<String>, PathRejection>,
) -> TaskResult<Json<&'static str>> {
    let Path(user_id) = user_id.map_err(|e| TaskError::Deletion(invalid_id(e)))?;
    service.delete_by_user(user_id).await?;
    Ok(Json(TASKS_DELETED))
}

fn invalid_payload(rejection: JsonRejection) -> StoreFault {
    StoreFault::InvalidPayload(rejection.body_text())
}

fn invalid_id(rejection: PathRejection) -> StoreFault {
    StoreFault::InvalidId(rejection.body_text())
}
