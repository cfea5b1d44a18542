use crate::common::cluster::{Endpoint, IdScheme, Node, checked_port, strided_port};
use crate::common::config::{ComposeConfig, DeploymentProfile};
use crate::common::descriptor::{
    ClusterDescriptor, EnvBinding, PortBinding, ServiceDescriptor, VolumeBinding,
};
use crate::common::error::{DeployError, Result};

const FABRIC_WORKDIR: &str = "/opt/gopath/src/github.com/hyperledger/fabric";
const COUCHDB_CONTAINER_PORT: u16 = 5984;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorParams {
    pub server_id: u32,
    pub peer_count: u32,
    pub id_scheme: IdScheme,
    pub base_peer_port: u16,
    pub base_db_port: u16,
    pub port_stride: u32,
    /// Server that hosts the single ordering service.
    pub orderer_server: u32,
    /// Gossip bootstrap address to use instead of the scheme's first peer.
    pub bootstrap_peer: Option<Endpoint>,
}

impl DescriptorParams {
    pub fn new(server_id: u32, peer_count: u32, id_scheme: IdScheme) -> Self {
        let config = ComposeConfig::default();
        DescriptorParams {
            server_id,
            peer_count,
            id_scheme,
            base_peer_port: config.base_peer_port,
            base_db_port: config.base_db_port,
            port_stride: config.port_stride,
            orderer_server: config.orderer_server,
            bootstrap_peer: None,
        }
    }

    pub fn from_config(
        server_id: u32,
        peer_count: u32,
        id_scheme: IdScheme,
        config: &ComposeConfig,
    ) -> Result<Self> {
        let bootstrap_peer = match &config.bootstrap_peer {
            Some(address) => Some(address.parse::<Endpoint>()?),
            None => None,
        };
        Ok(DescriptorParams {
            server_id,
            peer_count,
            id_scheme,
            base_peer_port: config.base_peer_port,
            base_db_port: config.base_db_port,
            port_stride: config.port_stride,
            orderer_server: config.orderer_server,
            bootstrap_peer,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.server_id < 1 {
            return Err(DeployError::invalid("server id must be at least 1"));
        }
        if self.peer_count < 1 {
            return Err(DeployError::invalid("peer count must be at least 1"));
        }
        if self.orderer_server < 1 {
            return Err(DeployError::invalid("orderer server id must be at least 1"));
        }
        if self.port_stride < 2 {
            return Err(DeployError::invalid(format!(
                "port stride {} leaves no room for the chaincode port",
                self.port_stride
            )));
        }
        if let IdScheme::ContiguousBlocks { peers_per_server } = self.id_scheme {
            if peers_per_server < 1 {
                return Err(DeployError::invalid("peers per server must be at least 1"));
            }
            if self.peer_count > peers_per_server {
                return Err(DeployError::invalid(format!(
                    "{} local peers overflow a block of {} peers per server",
                    self.peer_count, peers_per_server
                )));
            }
        }
        Ok(())
    }

    /// The first peer of the scheme is local index 1 on its server, so it
    /// listens on `base_peer_port`.
    fn bootstrap_address(&self, profile: &DeploymentProfile) -> String {
        match &self.bootstrap_peer {
            Some(endpoint) => endpoint.to_string(),
            None => format!(
                "{}:{}",
                peer_name(self.id_scheme.rendezvous_id(), profile),
                self.base_peer_port
            ),
        }
    }
}

/// Ports published by one local peer and its database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerPorts {
    pub peer: u16,
    pub chaincode: u16,
    pub db: u16,
}

impl PeerPorts {
    pub fn for_local_index(params: &DescriptorParams, local_index: u32) -> Result<Self> {
        let peer = strided_port(params.base_peer_port, local_index, params.port_stride, "peer")?;
        let chaincode = checked_port(u32::from(peer) + 1, "chaincode")?;
        let db = strided_port(params.base_db_port, local_index, params.port_stride, "database")?;
        Ok(PeerPorts {
            peer,
            chaincode,
            db,
        })
    }
}

pub fn peer_name(global_id: u32, profile: &DeploymentProfile) -> String {
    format!("peer{}.{}", global_id, profile.domain)
}

pub fn db_name(global_id: u32) -> String {
    format!("couchdb{}", global_id)
}

pub fn descriptor_file_name(prefix: &str, server_id: u32) -> String {
    format!("{}-server{}.yaml", prefix, server_id)
}

/// Builds the compose descriptor for one server's share of the cluster.
///
/// Each server runs this independently; ids, ports and the gossip
/// rendezvous address are derived from the shared parameters only, and the
/// ordering service is emitted only by `orderer_server` at local index 1.
pub fn build_descriptor(
    params: &DescriptorParams,
    profile: &DeploymentProfile,
) -> Result<ClusterDescriptor> {
    params.validate()?;
    let mut descriptor = ClusterDescriptor::new(&profile.network);
    let bootstrap = params.bootstrap_address(profile);

    for local_index in 1..=params.peer_count {
        let node = params.id_scheme.node(params.server_id, local_index)?;
        let ports = PeerPorts::for_local_index(params, local_index)?;

        if params.server_id == params.orderer_server && local_index == 1 {
            descriptor.add_service(&profile.orderer_name, orderer_service(profile)?)?;
            descriptor.declare_volume(&profile.orderer_name);
        }

        let db = db_name(node.global_id);
        descriptor.add_service(&db, db_service(node, ports, profile)?)?;
        descriptor.declare_volume(&db);

        let peer = peer_name(node.global_id, profile);
        descriptor.add_service(&peer, peer_service(node, ports, &bootstrap, profile)?)?;
        descriptor.declare_volume(&peer);
    }

    descriptor.validate()?;
    log::debug!(
        "Built descriptor for server {} with {} services",
        params.server_id,
        descriptor.services().len()
    );
    Ok(descriptor)
}

fn orderer_service(profile: &DeploymentProfile) -> Result<ServiceDescriptor> {
    let name = &profile.orderer_name;
    let msp_root = format!(
        "./crypto-config/ordererOrganizations/example.com/orderers/{}",
        name
    );
    let mut service = ServiceDescriptor::new(&profile.orderer_image, &profile.network);
    service.container_name = Some(name.clone());
    service.environment = vec![
        EnvBinding::new("FABRIC_LOGGING_SPEC", "INFO")?,
        EnvBinding::new("ORDERER_GENERAL_LISTENADDRESS", "0.0.0.0")?,
        EnvBinding::new("ORDERER_GENERAL_LISTENPORT", profile.orderer_port)?,
        EnvBinding::new("ORDERER_GENERAL_LOCALMSPID", &profile.orderer_msp_id)?,
        EnvBinding::new("ORDERER_GENERAL_LOCALMSPDIR", "/var/hyperledger/orderer/msp")?,
        EnvBinding::new("ORDERER_GENERAL_TLS_ENABLED", "false")?,
        EnvBinding::new("ORDERER_GENERAL_BOOTSTRAPMETHOD", "none")?,
        EnvBinding::new("ORDERER_CHANNELPARTICIPATION_ENABLED", "true")?,
        EnvBinding::new("ORDERER_ADMIN_TLS_ENABLED", "false")?,
        EnvBinding::new(
            "ORDERER_ADMIN_LISTENADDRESS",
            format!("0.0.0.0:{}", profile.orderer_admin_port),
        )?,
    ];
    service.working_dir = Some(FABRIC_WORKDIR.to_string());
    service.command = Some("orderer".to_string());
    service.volumes = vec![
        VolumeBinding::new(name, "/var/hyperledger/production/orderer")?,
        VolumeBinding::new("../build/bin/orderer", "/usr/local/bin/orderer")?.read_only(),
        VolumeBinding::new(&format!("{}/msp", msp_root), "/var/hyperledger/orderer/msp")?,
        VolumeBinding::new(&format!("{}/tls", msp_root), "/var/hyperledger/orderer/tls")?,
    ];
    service.ports = vec![
        PortBinding::same(profile.orderer_port),
        PortBinding::same(profile.orderer_admin_port),
    ];
    Ok(service)
}

fn db_service(node: Node, ports: PeerPorts, profile: &DeploymentProfile) -> Result<ServiceDescriptor> {
    let mut service = ServiceDescriptor::new(&profile.db_image, &profile.network);
    service.environment = vec![
        EnvBinding::new("COUCHDB_USER", &profile.db_user)?,
        EnvBinding::new("COUCHDB_PASSWORD", &profile.db_password)?,
    ];
    service.volumes = vec![VolumeBinding::new(&db_name(node.global_id), "/opt/couchdb/data")?];
    service.ports = vec![PortBinding {
        host: ports.db,
        container: COUCHDB_CONTAINER_PORT,
    }];
    Ok(service)
}

fn peer_service(
    node: Node,
    ports: PeerPorts,
    bootstrap: &str,
    profile: &DeploymentProfile,
) -> Result<ServiceDescriptor> {
    let name = peer_name(node.global_id, profile);
    let db = db_name(node.global_id);
    let msp_root = format!(
        "./crypto-config/peerOrganizations/{}/peers/{}",
        profile.domain, name
    );
    let mut service = ServiceDescriptor::new(&profile.peer_image, &profile.network);
    service.container_name = Some(name.clone());
    service.environment = vec![
        EnvBinding::new("CORE_VM_ENDPOINT", "unix:///host/var/run/docker.sock")?,
        EnvBinding::new("CORE_VM_DOCKER_HOSTCONFIG_NETWORKMODE", &profile.network)?,
        EnvBinding::new("CORE_PEER_ID", &name)?,
        EnvBinding::new("CORE_PEER_ADDRESS", format!("{}:{}", name, ports.peer))?,
        EnvBinding::new("CORE_PEER_LISTENADDRESS", format!("0.0.0.0:{}", ports.peer))?,
        EnvBinding::new(
            "CORE_PEER_CHAINCODELISTENADDRESS",
            format!("0.0.0.0:{}", ports.chaincode),
        )?,
        EnvBinding::new("CORE_PEER_GOSSIP_BOOTSTRAP", bootstrap)?,
        EnvBinding::new(
            "CORE_PEER_GOSSIP_EXTERNALENDPOINT",
            format!("{}:{}", name, ports.peer),
        )?,
        EnvBinding::new("CORE_PEER_LOCALMSPID", &profile.msp_id)?,
        EnvBinding::new("CORE_LEDGER_STATE_STATEDATABASE", "CouchDB")?,
        EnvBinding::new(
            "CORE_LEDGER_STATE_COUCHDBCONFIG_COUCHDBADDRESS",
            format!("{}:{}", db, COUCHDB_CONTAINER_PORT),
        )?,
        EnvBinding::new("CORE_LEDGER_STATE_COUCHDBCONFIG_USERNAME", &profile.db_user)?,
        EnvBinding::new("CORE_LEDGER_STATE_COUCHDBCONFIG_PASSWORD", &profile.db_password)?,
        EnvBinding::new("EXPERIMENTAL_SHARDING_ENABLED", "true")?,
        EnvBinding::new("CORE_PEER_TLS_ENABLED", "false")?,
        EnvBinding::new("CORE_PEER_MSPCONFIGPATH", "/etc/hyperledger/fabric/msp")?,
    ];
    service.volumes = vec![
        VolumeBinding::new("/var/run/docker.sock", "/host/var/run/docker.sock")?,
        VolumeBinding::new(&name, "/var/hyperledger/production")?,
        VolumeBinding::new("../build/bin/peer", "/usr/local/bin/peer")?.read_only(),
        VolumeBinding::new("./sharding.json", &format!("{}/peer/sharding.json", FABRIC_WORKDIR))?
            .read_only(),
        VolumeBinding::new(&format!("{}/msp", msp_root), "/etc/hyperledger/fabric/msp")?,
        VolumeBinding::new(&format!("{}/tls", msp_root), "/etc/hyperledger/fabric/tls")?,
        VolumeBinding::new("../../sampleconfig/core.yaml", "/etc/hyperledger/fabric/core.yaml")?
            .read_only(),
    ];
    service.working_dir = Some(format!("{}/peer", FABRIC_WORKDIR));
    service.command = Some("peer node start".to_string());
    service.ports = vec![
        PortBinding::same(ports.peer),
        PortBinding::same(ports.chaincode),
    ];
    service.depends_on = vec![db];
    Ok(service)
}
