use crate::common::cluster::IdSchemeKind;
use crate::common::error::{DeployError, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "deploy.toml";
pub const ENV_PREFIX: &str = "FABRIC_DEPLOY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub topology: TopologyConfig,
    pub compose: ComposeConfig,
    pub profile: DeploymentProfile,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub base_port: u16,
    pub hosts: Vec<String>,
    pub output: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        TopologyConfig {
            base_port: 7000,
            hosts: Vec::new(),
            output: "cluster.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub base_peer_port: u16,
    pub base_db_port: u16,
    pub port_stride: u32,
    pub orderer_server: u32,
    pub id_scheme: Option<IdSchemeKind>,
    pub peers_per_server: Option<u32>,
    pub start_peer: Option<u32>,
    /// `host:port` of the gossip bootstrap peer.
    pub bootstrap_peer: Option<String>,
    pub output_dir: String,
    pub prefix: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        ComposeConfig {
            base_peer_port: 7051,
            base_db_port: 5984,
            port_stride: 1000,
            orderer_server: 1,
            id_scheme: None,
            peers_per_server: None,
            start_peer: None,
            bootstrap_peer: None,
            output_dir: ".".to_string(),
            prefix: "docker-compose".to_string(),
        }
    }
}

/// Organisation-wide names and images shared by every generated service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeploymentProfile {
    pub domain: String,
    pub network: String,
    pub msp_id: String,
    pub peer_image: String,
    pub orderer_image: String,
    pub orderer_name: String,
    pub orderer_msp_id: String,
    pub orderer_port: u16,
    pub orderer_admin_port: u16,
    pub db_image: String,
    pub db_user: String,
    pub db_password: String,
}

impl Default for DeploymentProfile {
    fn default() -> Self {
        DeploymentProfile {
            domain: "org1.example.com".to_string(),
            network: "fabric_test".to_string(),
            msp_id: "Org1MSP".to_string(),
            peer_image: "hyperledger/fabric-peer:latest".to_string(),
            orderer_image: "hyperledger/fabric-orderer:latest".to_string(),
            orderer_name: "orderer.example.com".to_string(),
            orderer_msp_id: "OrdererMSP".to_string(),
            orderer_port: 7050,
            orderer_admin_port: 7053,
            db_image: "couchdb:3.1.1".to_string(),
            db_user: "admin".to_string(),
            db_password: "adminpw".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            url: "http://127.0.0.1:5984".to_string(),
            user: "admin".to_string(),
            password: "adminpw".to_string(),
            database: "fabric_analytics".to_string(),
        }
    }
}

/// Layers `.env`, the optional config file at `path` and `FABRIC_DEPLOY__*`
/// variables over the built-in defaults.
pub fn load_deploy_config(path: &str) -> Result<DeployConfig> {
    dotenv::dotenv().ok();
    if Path::new(path).exists() {
        log::debug!("Loading deploy config from {}", path);
    }
    let settings = config::Config::builder()
        .add_source(config::File::from(Path::new(path)).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("topology.hosts"),
        )
        .build()
        .map_err(|e| DeployError::invalid(format!("failed to load config: {}", e)))?;
    settings
        .try_deserialize::<DeployConfig>()
        .map_err(|e| DeployError::invalid(format!("failed to parse config: {}", e)))
}
