use crate::cli::args::{ComposeArgs, TopologyArgs, UploadArgs};
use crate::common::cluster::IdScheme;
use crate::common::config::{ComposeConfig, DeployConfig, StoreConfig, TopologyConfig};
use crate::common::error::Result;
use crate::generator::descriptor_builder::DescriptorParams;
use crate::generator::topology::TopologyRequest;
use crate::storage::couchdb::{
    couchdb_client::CouchDbClient, couchdb_metrics_store::CouchDbMetricsStore,
};

/// Flags win over config values.
pub fn merge_topology_args(args: &TopologyArgs, config: &TopologyConfig) -> TopologyConfig {
    TopologyConfig {
        base_port: args.base_port.unwrap_or(config.base_port),
        hosts: if args.hosts.is_empty() {
            config.hosts.clone()
        } else {
            args.hosts.clone()
        },
        output: args.output.clone().unwrap_or_else(|| config.output.clone()),
    }
}

pub fn load_topology_request(args: &TopologyArgs, config: &DeployConfig) -> (TopologyRequest, String) {
    let merged = merge_topology_args(args, &config.topology);
    let request = TopologyRequest {
        total_nodes: args.nodes,
        server_count: args.servers,
        hosts: merged.hosts,
        base_port: merged.base_port,
    };
    (request, merged.output)
}

pub fn merge_compose_args(args: &ComposeArgs, config: &ComposeConfig) -> ComposeConfig {
    ComposeConfig {
        base_peer_port: args.base_peer_port.unwrap_or(config.base_peer_port),
        base_db_port: args.base_db_port.unwrap_or(config.base_db_port),
        port_stride: args.port_stride.unwrap_or(config.port_stride),
        orderer_server: args.orderer_server.unwrap_or(config.orderer_server),
        id_scheme: args.id_scheme.or(config.id_scheme),
        peers_per_server: args.peers_per_server.or(config.peers_per_server),
        start_peer: args.start_peer.or(config.start_peer),
        bootstrap_peer: args
            .bootstrap_peer
            .clone()
            .or_else(|| config.bootstrap_peer.clone()),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir.clone()),
        prefix: args.prefix.clone().unwrap_or_else(|| config.prefix.clone()),
    }
}

pub fn load_descriptor_params(
    args: &ComposeArgs,
    config: &DeployConfig,
) -> Result<(DescriptorParams, ComposeConfig)> {
    let merged = merge_compose_args(args, &config.compose);
    let scheme = IdScheme::resolve(merged.id_scheme, merged.start_peer, merged.peers_per_server)?;
    log::debug!("Using {} id scheme: {:?}", scheme.kind(), scheme);
    let params = DescriptorParams::from_config(args.server, args.peers, scheme, &merged)?;
    Ok((params, merged))
}

pub fn load_store_config(args: &UploadArgs, config: &StoreConfig) -> StoreConfig {
    StoreConfig {
        url: args.store_url.clone().unwrap_or_else(|| config.url.clone()),
        database: args
            .database
            .clone()
            .unwrap_or_else(|| config.database.clone()),
        ..config.clone()
    }
}

pub fn load_metrics_store(store_config: &StoreConfig) -> CouchDbMetricsStore {
    log::debug!("Using CouchDB metrics store");
    let client = CouchDbClient::new(&store_config.url, &store_config.user, &store_config.password);
    CouchDbMetricsStore::new(client, &store_config.database)
}
