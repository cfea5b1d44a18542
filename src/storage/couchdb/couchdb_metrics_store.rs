use crate::common::benchmark::BenchmarkDocument;
use crate::common::error::{DeployError, Result};
use crate::storage::couchdb::couchdb_client::{CouchDbClient, StoreResponse};
use crate::traits::metrics_store::{DatabaseStatus, MetricsStore};
use reqwest::StatusCode;
use serde::Deserialize;

pub struct CouchDbMetricsStore {
    client: CouchDbClient,
    database: String,
}

#[derive(Deserialize)]
struct InsertReply {
    id: String,
}

impl CouchDbMetricsStore {
    pub fn new(client: CouchDbClient, database: &str) -> Self {
        CouchDbMetricsStore {
            client,
            database: database.to_string(),
        }
    }
}

fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::CREATED || status == StatusCode::ACCEPTED
}

fn upstream(response: StoreResponse) -> DeployError {
    DeployError::Upstream {
        status: response.status.as_u16(),
        body: response.body,
    }
}

impl MetricsStore for CouchDbMetricsStore {
    async fn ensure_database(&self) -> Result<DatabaseStatus> {
        let response = self.client.put(&self.database).await?;
        if is_accepted(response.status) {
            log::info!("Created database '{}'", self.database);
            Ok(DatabaseStatus::Created)
        } else if response.status == StatusCode::PRECONDITION_FAILED {
            log::debug!("Database '{}' already exists", self.database);
            Ok(DatabaseStatus::AlreadyExists)
        } else {
            Err(upstream(response))
        }
    }

    async fn insert_document(&self, doc: &BenchmarkDocument) -> Result<String> {
        let response = self.client.post_json(&self.database, doc).await?;
        if !is_accepted(response.status) {
            log::warn!(
                "Failed to upload document: {} - {}",
                response.status,
                response.body
            );
            return Err(upstream(response));
        }
        let reply: InsertReply = serde_json::from_str(&response.body)?;
        Ok(reply.id)
    }
}
