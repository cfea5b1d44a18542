use crate::common::cluster::{Endpoint, LOOPBACK_HOST, Node};
use crate::common::error::{DeployError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct TopologyRequest {
    pub total_nodes: u32,
    pub server_count: u32,
    /// One address per server in server order; missing or empty entries mean loopback.
    pub hosts: Vec<String>,
    pub base_port: u16,
}

/// How node ports are offset from the base port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortPolicy {
    /// Every server shares one host, so ports are offset by the global id.
    Global,
    /// Servers have their own hosts, so each block restarts at `base_port + 1`.
    BlockLocal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub node: Node,
    pub endpoint: Endpoint,
}

/// What one server needs to run `compose` for its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPlan {
    pub server_id: u32,
    pub host: String,
    pub peers: u32,
    pub start_peer: u32,
}

#[derive(Debug, Clone)]
pub struct Topology {
    policy: PortPolicy,
    assignments: Vec<Assignment>,
    plans: Vec<ServerPlan>,
}

/// On-disk shape of `cluster.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyFile {
    pub peers: IndexMap<u32, String>,
}

pub fn assign_topology(request: &TopologyRequest) -> Result<Topology> {
    if request.server_count == 0 {
        return Err(DeployError::invalid("server count must be at least 1"));
    }
    if request.total_nodes == 0 {
        return Err(DeployError::invalid("total node count must be at least 1"));
    }
    if request.total_nodes % request.server_count != 0 {
        return Err(DeployError::invalid(format!(
            "{} nodes cannot be split into {} equal server blocks",
            request.total_nodes, request.server_count
        )));
    }

    if request.hosts.len() > request.server_count as usize {
        return Err(DeployError::invalid(format!(
            "{} hosts given for {} servers",
            request.hosts.len(),
            request.server_count
        )));
    }
    let policy = port_policy(&request.hosts, request.server_count);
    let block = request.total_nodes / request.server_count;
    check_port_range(request, policy, block)?;

    let hosts = resolve_hosts(&request.hosts, request.server_count);
    log::debug!(
        "Assigning {} nodes over {} servers ({} per server, {:?} ports)",
        request.total_nodes,
        request.server_count,
        block,
        policy
    );

    let mut assignments = Vec::with_capacity(request.total_nodes as usize);
    let mut plans = Vec::with_capacity(hosts.len());
    for (i, host) in hosts.iter().enumerate() {
        let server_id = i as u32 + 1;
        let block_start = i as u32 * block + 1;
        plans.push(ServerPlan {
            server_id,
            host: host.clone(),
            peers: block,
            start_peer: block_start,
        });
        for local_index in 1..=block {
            let global_id = block_start + local_index - 1;
            let offset = match policy {
                PortPolicy::Global => global_id,
                PortPolicy::BlockLocal => local_index,
            };
            let endpoint = Endpoint::new(host, u32::from(request.base_port) + offset)?;
            assignments.push(Assignment {
                node: Node {
                    global_id,
                    server_id,
                    local_index,
                },
                endpoint,
            });
        }
    }

    check_host_ports(&assignments)?;
    Ok(Topology {
        policy,
        assignments,
        plans,
    })
}

fn resolve_host(host: &str) -> &str {
    if host.is_empty() {
        LOOPBACK_HOST
    } else {
        host
    }
}

// Hosts compare as given; only empty entries and the padding stand for loopback.
fn port_policy(hosts: &[String], server_count: u32) -> PortPolicy {
    let padding = (hosts.len() < server_count as usize).then_some(LOOPBACK_HOST);
    let mut resolved = hosts.iter().map(|h| resolve_host(h)).chain(padding);
    let first = resolved.next();
    if resolved.all(|h| Some(h) == first) {
        PortPolicy::Global
    } else {
        PortPolicy::BlockLocal
    }
}

// Runs before anything is sized by the node or server count.
fn check_port_range(request: &TopologyRequest, policy: PortPolicy, block: u32) -> Result<()> {
    let largest_offset = match policy {
        PortPolicy::Global => request.total_nodes,
        PortPolicy::BlockLocal => block,
    };
    let top = u64::from(request.base_port) + u64::from(largest_offset);
    if top > u64::from(u16::MAX) {
        return Err(DeployError::invalid(format!(
            "{} nodes from base port {} need port {}, above 65535",
            request.total_nodes, request.base_port, top
        )));
    }
    // Padded servers all land on loopback and would repeat block-local ports.
    let padded = request.server_count as usize - request.hosts.len();
    if policy == PortPolicy::BlockLocal && padded > 1 {
        return Err(DeployError::invalid(format!(
            "{} servers share {} with block-local ports; give every server its own host",
            padded,
            LOOPBACK_HOST
        )));
    }
    Ok(())
}

fn resolve_hosts(hosts: &[String], server_count: u32) -> Vec<String> {
    let mut resolved: Vec<String> = hosts.iter().map(|h| resolve_host(h).to_string()).collect();
    resolved.resize(server_count as usize, LOOPBACK_HOST.to_string());
    resolved
}

// Block-local ports repeat per server, so a host shared by only some servers
// would see the same port twice.
fn check_host_ports(assignments: &[Assignment]) -> Result<()> {
    let mut seen: HashMap<&str, HashSet<u16>> = HashMap::new();
    for a in assignments {
        let ports = seen.entry(a.endpoint.host()).or_default();
        if !ports.insert(a.endpoint.port()) {
            return Err(DeployError::invalid(format!(
                "host {} would get port {} twice; give every server its own host or the same host for all",
                a.endpoint.host(),
                a.endpoint.port()
            )));
        }
    }
    Ok(())
}

impl Topology {
    pub fn policy(&self) -> PortPolicy {
        self.policy
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn server_plans(&self) -> &[ServerPlan] {
        &self.plans
    }

    pub fn to_file(&self) -> TopologyFile {
        TopologyFile {
            peers: self
                .assignments
                .iter()
                .map(|a| (a.node.global_id, a.endpoint.to_string()))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }
}
