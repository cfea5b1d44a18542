use crate::analytics::log_parser::LogPatterns;
use crate::cli::args::{ComposeArgs, TopologyArgs, UploadArgs};
use crate::cli::loader::{
    load_descriptor_params, load_metrics_store, load_store_config, load_topology_request,
};
use crate::common::config::DeployConfig;
use crate::common::error::{DeployError, Result};
use crate::generator::descriptor_builder::{build_descriptor, descriptor_file_name};
use crate::generator::topology::assign_topology;
use crate::storage::file::file_artifact_store::FileArtifactStore;
use crate::traits::artifact_store::ArtifactStore;
use crate::traits::metrics_store::MetricsStore;
use std::path::{Path, PathBuf};

pub fn run_topology(args: &TopologyArgs, config: &DeployConfig) -> Result<PathBuf> {
    let (request, output) = load_topology_request(args, config);
    let topology = assign_topology(&request)?;
    let json = topology.to_json()?;

    let output = Path::new(&output);
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = output
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DeployError::invalid(format!("bad output path {}", output.display())))?;
    let path = FileArtifactStore::new(dir).write_artifact(name, json.as_bytes())?;

    log::info!(
        "Generated {} with {} nodes ({:?} ports)",
        path.display(),
        topology.assignments().len(),
        topology.policy()
    );
    for plan in topology.server_plans() {
        log::info!(
            "Server {} ({}, nodes {}..={}): compose --server {} --peers {} --peers-per-server {}",
            plan.server_id,
            plan.host,
            plan.start_peer,
            plan.start_peer + plan.peers - 1,
            plan.server_id,
            plan.peers,
            plan.peers
        );
    }
    log::info!("Copy this file to all servers.");
    Ok(path)
}

pub fn run_compose(args: &ComposeArgs, config: &DeployConfig) -> Result<PathBuf> {
    let (params, merged) = load_descriptor_params(args, config)?;
    let descriptor = build_descriptor(&params, &config.profile)?;
    let yaml = descriptor.to_yaml()?;

    let name = descriptor_file_name(&merged.prefix, params.server_id);
    let path = FileArtifactStore::new(&merged.output_dir).write_artifact(&name, yaml.as_bytes())?;
    log::info!(
        "Generated {} for {} peers ({} services)",
        path.display(),
        params.peer_count,
        descriptor.services().len()
    );
    Ok(path)
}

/// Ensures the database exists, then parses and inserts the log.
/// Returns `Ok(None)` when the log file does not exist.
pub async fn upload_log<S: MetricsStore>(
    store: &S,
    patterns: &LogPatterns,
    log_file: &Path,
    fabric_version: &str,
) -> Result<Option<String>> {
    store.ensure_database().await?;

    let Some(doc) = patterns.parse_file(log_file, fabric_version)? else {
        log::warn!("Log file '{}' not found, skipping upload", log_file.display());
        return Ok(None);
    };
    let id = store.insert_document(&doc).await?;
    log::info!("Successfully uploaded analytics doc: {}", id);
    Ok(Some(id))
}

pub async fn run_upload(args: &UploadArgs, config: &DeployConfig) -> Result<Option<String>> {
    let store_config = load_store_config(args, &config.store);
    let store = load_metrics_store(&store_config);
    let patterns = LogPatterns::new()?;
    upload_log(&store, &patterns, &args.log_file, &args.fabric_version).await
}
