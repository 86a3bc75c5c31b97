use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::StoreResult;
use crate::models::{CreateTask, Task, TaskFilter, UpdateTask};

/// Data access for tasks.
///
/// Each method is a single store interaction. Absence is `Ok(None)` or a
/// zero count, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Tasks matching `filter`, in store order
    async fn find(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Task>>;

    /// Persist a new task and return it with its assigned id
    async fn insert(&self, input: CreateTask) -> StoreResult<Task>;

    /// Apply `input` to the task if it exists; returns whether one matched
    async fn update_by_id(&self, id: ObjectId, input: UpdateTask) -> StoreResult<bool>;

    /// Returns whether a task was removed
    async fn delete_by_id(&self, id: ObjectId) -> StoreResult<bool>;

    /// Returns the number of tasks removed
    async fn delete_by_user(&self, user_id: String) -> StoreResult<u64>;
}
