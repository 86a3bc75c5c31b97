//! Tasks Domain
//!
//! CRUD and search over user-owned tasks stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Operations, error mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Task, payloads, filters
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{MongoTaskRepository, TaskService, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoTaskRepository::new(client.database("todo"));
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(TaskService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{StoreFault, StoreResult, TaskError, TaskResult};
pub use handlers::{ApiDoc, TASK_DELETED, TASKS_DELETED};
pub use models::{CreateTask, Task, TaskFilter, TaskSearch, UpdateTask, parse_task_id};
pub use mongodb::{DEFAULT_COLLECTION, MongoTaskRepository};
pub use repository::TaskRepository;
pub use service::TaskService;
