pub mod file {
    pub mod file_artifact_store;
}
pub mod couchdb {
    pub mod couchdb_client;
    pub mod couchdb_metrics_store;
}
