use crate::common::benchmark::BenchmarkDocument;
use crate::common::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    Created,
    AlreadyExists,
}

#[trait_variant::make(MetricsStore: Send)]
pub trait UnsendMetricsStore {
    async fn ensure_database(&self) -> Result<DatabaseStatus>;
    /// Inserts `doc` and returns the id the store assigned to it.
    async fn insert_document(&self, doc: &BenchmarkDocument) -> Result<String>;
}
