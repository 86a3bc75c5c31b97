//! Wires the tasks domain to HTTP routes.

use axum::Router;
use domain_tasks::{MongoTaskRepository, TaskService, handlers};

use crate::state::AppState;

fn repository(state: &AppState) -> MongoTaskRepository {
    MongoTaskRepository::with_collection(state.db.clone(), &state.config.tasks_collection)
}

pub fn router(state: &AppState) -> Router {
    let service = TaskService::new(repository(state));
    handlers::router(service)
}

/// Ensure task collection indexes exist
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    repository(state)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create task indexes: {}", e))
}
