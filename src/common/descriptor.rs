use crate::common::error::{DeployError, Result};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

pub const COMPOSE_FILE_VERSION: &str = "3.7";

/// One `KEY=VALUE` entry of a service environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    key: String,
    value: String,
}

impl EnvBinding {
    pub fn new(key: &str, value: impl ToString) -> Result<Self> {
        if key.is_empty() || key.contains('=') {
            return Err(DeployError::invalid(format!(
                "environment key {:?} is empty or contains '='",
                key
            )));
        }
        Ok(EnvBinding {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Serialize for EnvBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}={}", self.key, self.value))
    }
}

/// A mount, either of a named volume or of a host path (`./x`, `../x`, `/x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    source: String,
    target: String,
    read_only: bool,
}

impl VolumeBinding {
    pub fn new(source: &str, target: &str) -> Result<Self> {
        if source.is_empty() || target.is_empty() {
            return Err(DeployError::invalid("volume source and target must be set"));
        }
        if !target.starts_with('/') {
            return Err(DeployError::invalid(format!(
                "volume target {:?} must be an absolute container path",
                target
            )));
        }
        Ok(VolumeBinding {
            source: source.to_string(),
            target: target.to_string(),
            read_only: false,
        })
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_named(&self) -> bool {
        !(self.source.starts_with('.') || self.source.starts_with('/'))
    }
}

impl Serialize for VolumeBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.read_only {
            serializer.collect_str(&format_args!("{}:{}:ro", self.source, self.target))
        } else {
            serializer.collect_str(&format_args!("{}:{}", self.source, self.target))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortBinding {
    pub host: u16,
    pub container: u16,
}

impl PortBinding {
    pub fn same(port: u16) -> Self {
        PortBinding {
            host: port,
            container: port,
        }
    }
}

impl Serialize for PortBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}:{}", self.host, self.container))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    pub image: String,
    pub environment: Vec<EnvBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeBinding>,
    pub ports: Vec<PortBinding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub networks: Vec<String>,
}

impl ServiceDescriptor {
    pub fn new(image: &str, network: &str) -> Self {
        ServiceDescriptor {
            container_name: None,
            image: image.to_string(),
            environment: Vec::new(),
            working_dir: None,
            command: None,
            volumes: Vec::new(),
            ports: Vec::new(),
            depends_on: Vec::new(),
            networks: vec![network.to_string()],
        }
    }

    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment
            .iter()
            .find(|b| b.key() == key)
            .map(|b| b.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDeclaration {
    pub name: String,
}

/// Serialized as `null`, i.e. a named volume with driver defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeDeclaration;

/// Everything one server runs, as written to its compose file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterDescriptor {
    version: String,
    networks: IndexMap<String, NetworkDeclaration>,
    volumes: IndexMap<String, VolumeDeclaration>,
    services: IndexMap<String, ServiceDescriptor>,
}

impl ClusterDescriptor {
    pub fn new(network: &str) -> Self {
        let mut networks = IndexMap::new();
        networks.insert(
            network.to_string(),
            NetworkDeclaration {
                name: network.to_string(),
            },
        );
        ClusterDescriptor {
            version: COMPOSE_FILE_VERSION.to_string(),
            networks,
            volumes: IndexMap::new(),
            services: IndexMap::new(),
        }
    }

    pub fn add_service(&mut self, name: &str, service: ServiceDescriptor) -> Result<()> {
        if self.services.contains_key(name) {
            return Err(DeployError::invalid(format!(
                "service {} is defined twice",
                name
            )));
        }
        log::debug!("Adding service {} ({})", name, service.image);
        self.services.insert(name.to_string(), service);
        Ok(())
    }

    pub fn declare_volume(&mut self, name: &str) {
        self.volumes.insert(name.to_string(), VolumeDeclaration);
    }

    pub fn services(&self) -> &IndexMap<String, ServiceDescriptor> {
        &self.services
    }

    pub fn service(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(name)
    }

    pub fn volume_names(&self) -> impl Iterator<Item = &str> {
        self.volumes.keys().map(String::as_str)
    }

    pub fn network_names(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    /// All published host ports in service order.
    pub fn host_ports(&self) -> Vec<u16> {
        self.services
            .values()
            .flat_map(|s| s.ports.iter().map(|p| p.host))
            .collect()
    }

    /// Checks cross-references and host port uniqueness.
    pub fn validate(&self) -> Result<()> {
        let mut owners: HashMap<u16, &str> = HashMap::new();
        for (name, service) in &self.services {
            for dep in &service.depends_on {
                if !self.services.contains_key(dep) {
                    return Err(DeployError::invalid(format!(
                        "service {} depends on undefined service {}",
                        name, dep
                    )));
                }
            }
            for volume in service.volumes.iter().filter(|v| v.is_named()) {
                if !self.volumes.contains_key(volume.source()) {
                    return Err(DeployError::invalid(format!(
                        "service {} mounts undeclared volume {}",
                        name,
                        volume.source()
                    )));
                }
            }
            for network in &service.networks {
                if !self.networks.contains_key(network) {
                    return Err(DeployError::invalid(format!(
                        "service {} joins undeclared network {}",
                        name, network
                    )));
                }
            }
            for port in &service.ports {
                if let Some(owner) = owners.insert(port.host, name) {
                    return Err(DeployError::invalid(format!(
                        "host port {} is published by both {} and {}",
                        port.host, owner, name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
