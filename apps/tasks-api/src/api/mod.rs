//! API routes module

pub mod health;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// All API routes; nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/tasks", tasks::router(state))
        .merge(health::router(state.clone()))
}
