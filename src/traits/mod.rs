pub mod artifact_store;
pub mod metrics_store;
