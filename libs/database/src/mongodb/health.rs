use mongodb::{Client, bson::doc};

use crate::common::DatabaseError;

/// Ping the server, reporting only success or failure
pub async fn check_health(client: &Client) -> Result<(), DatabaseError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))
}
