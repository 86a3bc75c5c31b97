use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Failure at the task store boundary
#[derive(Debug, Error)]
pub enum StoreFault {
    #[error("invalid task id '{0}'")]
    InvalidId(String),

    #[error("invalid task payload: {0}")]
    InvalidPayload(String),

    #[error("malformed task document: {0}")]
    MalformedDocument(String),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type StoreResult<T> = Result<T, StoreFault>;

/// Operation-level failure returned by [`TaskService`](crate::TaskService).
///
/// Every variant is a 500 carrying the underlying [`StoreFault`] text.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("An error occurred while searching for tasks: {0}")]
    Search(#[source] StoreFault),

    #[error("Failed to retrieve tasks: {0}")]
    Retrieval(#[source] StoreFault),

    #[error("Failed to create task: {0}")]
    Creation(#[source] StoreFault),

    #[error("Failed to update task: {0}")]
    Update(#[source] StoreFault),

    #[error("Failed to delete tasks: {0}")]
    Deletion(#[source] StoreFault),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
