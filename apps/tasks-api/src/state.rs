//! Application state shared by the route builders and readiness probe.

use database::mongodb::connect_from_config_with_retry;
use mongodb::{Client, Database};
use tracing::info;

use crate::config::Config;

/// Cloned per router; the MongoDB handles share one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub mongo_client: Client,
    pub db: Database,
}

impl AppState {
    /// Open the task store, retrying while MongoDB comes up
    pub async fn connect(config: Config) -> eyre::Result<Self> {
        let mongo_client = connect_from_config_with_retry(&config.mongodb, None)
            .await
            .map_err(|e| eyre::eyre!("Task store unreachable: {}", e))?;
        let db = mongo_client.database(config.mongodb.database());

        info!(
            database = %db.name(),
            collection = %config.tasks_collection,
            "Task store ready"
        );

        Ok(Self {
            config,
            mongo_client,
            db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::{Environment, app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use test_utils::TestMongo;

    #[tokio::test]
    async fn test_connect_opens_configured_database() {
        let mongo = TestMongo::new().await;
        let config = Config {
            app: app_info!(),
            mongodb: MongoConfig::with_database(mongo.connection_string(), "todo"),
            server: ServerConfig::new("127.0.0.1", 0),
            environment: Environment::Development,
            tasks_collection: "todo_items".to_string(),
        };

        let state = AppState::connect(config).await.unwrap();

        assert_eq!(state.db.name(), "todo");
        assert_eq!(state.config.tasks_collection, "todo_items");
        state.mongo_client.shutdown().await;
    }
}
