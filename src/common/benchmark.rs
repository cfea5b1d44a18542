use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One benchmark run as stored in the analytics database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkDocument {
    pub id: String,
    pub timestamp: String, // RFC 3339, UTC, `Z` suffix
    pub fabric_version: String,
    pub log_file: String,
    pub tx_count: u64,
    pub dependency_rate: f64,
    pub threads: u32,
    pub throughput: f64,
    pub reject_rate: f64,
    pub avg_response_time: f64,
}

impl BenchmarkDocument {
    pub fn new(fabric_version: &str, log_file: &str) -> Self {
        BenchmarkDocument {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            fabric_version: fabric_version.to_string(),
            log_file: log_file.to_string(),
            tx_count: 0,
            dependency_rate: 0.0,
            threads: 0,
            throughput: 0.0,
            reject_rate: 0.0,
            avg_response_time: 0.0,
        }
    }
}
