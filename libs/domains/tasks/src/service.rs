//! Task Service - operation layer over a [`TaskRepository`]

use std::sync::Arc;
use tracing::instrument;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskFilter, TaskSearch, UpdateTask, parse_task_id};
use crate::repository::TaskRepository;

/// Task service.
///
/// Each operation is a single store call (update is two) and wraps any
/// store fault in the [`TaskError`] variant for that operation.
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Tasks matching the search parameters; unusable parameters are dropped
    #[instrument(skip(self))]
    pub async fn search(&self, search: TaskSearch) -> TaskResult<Vec<Task>> {
        self.repository
            .find(TaskFilter::from(search))
            .await
            .map_err(TaskError::Search)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> TaskResult<Vec<Task>> {
        self.repository
            .find(TaskFilter::all())
            .await
            .map_err(TaskError::Retrieval)
    }

    #[instrument(skip(self))]
    pub async fn list_by_user(&self, user_id: String) -> TaskResult<Vec<Task>> {
        self.repository
            .find(TaskFilter::for_user(user_id))
            .await
            .map_err(TaskError::Retrieval)
    }

    /// Remove every task owned by `user_id`, returning how many went
    #[instrument(skip(self))]
    pub async fn delete_by_user(&self, user_id: String) -> TaskResult<u64> {
        self.repository
            .delete_by_user(user_id)
            .await
            .map_err(TaskError::Deletion)
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        self.repository
            .insert(input)
            .await
            .map_err(TaskError::Creation)
    }

    /// `None` when no task has this id
    #[instrument(skip(self))]
    pub async fn get(&self, task_id: &str) -> TaskResult<Option<Task>> {
        let id = parse_task_id(task_id).map_err(TaskError::Retrieval)?;
        self.repository
            .find_by_id(id)
            .await
            .map_err(TaskError::Retrieval)
    }

    /// Apply a partial update and return the task as read back afterwards.
    ///
    /// An unknown id is not an error; the result is then `None`. The write
    /// and the re-read are independent, so a concurrent delete can also
    /// yield `None`.
    #[instrument(skip(self, input))]
    pub async fn update(&self, task_id: &str, input: UpdateTask) -> TaskResult<Option<Task>> {
        let id = parse_task_id(task_id).map_err(TaskError::Update)?;

        if !input.is_empty() {
            let matched = self
                .repository
                .update_by_id(id, input)
                .await
                .map_err(TaskError::Update)?;
            tracing::debug!(matched, "Update written");
        }

        self.repository
            .find_by_id(id)
            .await
            .map_err(TaskError::Update)
    }

    /// Succeeds whether or not the task existed
    #[instrument(skip(self))]
    pub async fn delete(&self, task_id: &str) -> TaskResult<()> {
        let id = parse_task_id(task_id).map_err(TaskError::Deletion)?;
        let deleted = self
            .repository
            .delete_by_id(id)
            .await
            .map_err(TaskError::Deletion)?;

        if !deleted {
            tracing::debug!("No task to delete");
        }
        Ok(())
    }
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
