use crate::common::benchmark::BenchmarkDocument;
use crate::common::error::{DeployError, Result};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind::NotFound};
use std::path::Path;

/// The four line patterns of the benchmark client's log output.
#[derive(Debug, Clone)]
pub struct LogPatterns {
    load_params: Regex,
    throughput: Regex,
    reject_rate: Regex,
    avg_response: Regex,
}

impl LogPatterns {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| DeployError::invalid(format!("bad log pattern {}: {}", pattern, e)))
        };
        Ok(LogPatterns {
            load_params: compile(
                r"Load Parameters\s*:\s*(\d+)\s*Txs\s*\|\s*([\d.]+)%\s*Dependency\s*\|\s*(\d+)\s*Threads",
            )?,
            throughput: compile(r"\[METRICS\]\s*Throughput:\s*([\d.]+)\s*TPS")?,
            reject_rate: compile(r"\[METRICS\]\s*RejectRate:\s*([\d.]+)%")?,
            avg_response: compile(r"\[METRICS\]\s*AvgResponse:\s*([\d.]+)ms")?,
        })
    }

    /// Folds one line into `doc`. Later matches overwrite earlier ones.
    pub fn apply_line(&self, line: &str, doc: &mut BenchmarkDocument) {
        if let Some(caps) = self.load_params.captures(line) {
            // A capture that does not parse (e.g. "1.2.3") leaves the previous value.
            if let Ok(v) = caps[1].parse() {
                doc.tx_count = v;
            }
            if let Ok(v) = caps[2].parse() {
                doc.dependency_rate = v;
            }
            if let Ok(v) = caps[3].parse() {
                doc.threads = v;
            }
        }
        if let Some(v) = capture_f64(&self.throughput, line) {
            doc.throughput = v;
        }
        if let Some(v) = capture_f64(&self.reject_rate, line) {
            doc.reject_rate = v;
        }
        if let Some(v) = capture_f64(&self.avg_response, line) {
            doc.avg_response_time = v;
        }
    }

    pub fn parse_lines<'a>(
        &self,
        lines: impl IntoIterator<Item = &'a str>,
        fabric_version: &str,
        log_file: &str,
    ) -> BenchmarkDocument {
        let mut doc = BenchmarkDocument::new(fabric_version, log_file);
        for line in lines {
            self.apply_line(line, &mut doc);
        }
        doc
    }

    /// Parses a log file. A missing file yields `Ok(None)`.
    pub fn parse_file(&self, path: &Path, fabric_version: &str) -> Result<Option<BenchmarkDocument>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == NotFound => return Ok(None),
            Err(e) => return Err(DeployError::io(path, e)),
        };
        let mut doc = BenchmarkDocument::new(fabric_version, &path.to_string_lossy());
        let mut count = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| DeployError::io(path, e))?;
            self.apply_line(&line, &mut doc);
            count += 1;
        }
        log::debug!("Scanned {} lines of {}", count, path.display());
        Ok(Some(doc))
    }
}

fn capture_f64(re: &Regex, line: &str) -> Option<f64> {
    re.captures(line).and_then(|caps| caps[1].parse().ok())
}
