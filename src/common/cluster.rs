use crate::common::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LOOPBACK_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub global_id: u32,
    pub server_id: u32,
    pub local_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: &str, port: u32) -> Result<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(DeployError::invalid("endpoint host must not be empty"));
        }
        let port = checked_port(port, "endpoint")?;
        Ok(Endpoint {
            host: host.to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Endpoint {
    type Err = DeployError;

    /// Parses `host:port`.
    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| DeployError::invalid(format!("endpoint '{}' is not host:port", s)))?;
        let port: u32 = port
            .parse()
            .map_err(|_| DeployError::invalid(format!("endpoint '{}' has no numeric port", s)))?;
        Endpoint::new(host, port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Narrows a computed port into the valid TCP range, naming `label` in the error.
pub fn checked_port(port: u32, label: &str) -> Result<u16> {
    match u16::try_from(port) {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(DeployError::invalid(format!(
            "{} port {} is outside 1..=65535",
            label, port
        ))),
    }
}

/// `base + (local_index - 1) * stride`, checked against the port range.
pub fn strided_port(base: u16, local_index: u32, stride: u32, label: &str) -> Result<u16> {
    let offset = u64::from(local_index.saturating_sub(1)) * u64::from(stride);
    let port = u64::from(base) + offset;
    let port = u32::try_from(port).unwrap_or(u32::MAX);
    checked_port(port, label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdSchemeKind {
    ContiguousBlocks,
    OffsetPlusLocal,
}

impl FromStr for IdSchemeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "contiguous-blocks" => Ok(IdSchemeKind::ContiguousBlocks),
            "offset-plus-local" => Ok(IdSchemeKind::OffsetPlusLocal),
            other => Err(format!(
                "unknown id scheme {:?} (expected contiguous-blocks or offset-plus-local)",
                other
            )),
        }
    }
}

impl fmt::Display for IdSchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdSchemeKind::ContiguousBlocks => write!(f, "contiguous-blocks"),
            IdSchemeKind::OffsetPlusLocal => write!(f, "offset-plus-local"),
        }
    }
}

/// How a server derives cluster-wide peer ids from its local indices.
///
/// `ContiguousBlocks` gives every server an equal, 1-based block of ids
/// (server 2 with 5 peers per server owns 6..=10). `OffsetPlusLocal` adds the
/// local index to an operator-supplied `start_peer`, which keeps the legacy
/// 0-based numbering where the first peer of the cluster is `peer0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    ContiguousBlocks { peers_per_server: u32 },
    OffsetPlusLocal { start_peer: u32 },
}

impl IdScheme {
    pub fn kind(&self) -> IdSchemeKind {
        match self {
            IdScheme::ContiguousBlocks { .. } => IdSchemeKind::ContiguousBlocks,
            IdScheme::OffsetPlusLocal { .. } => IdSchemeKind::OffsetPlusLocal,
        }
    }

    pub fn global_id(&self, server_id: u32, local_index: u32) -> Result<u32> {
        if server_id < 1 || local_index < 1 {
            return Err(DeployError::invalid(format!(
                "server id ({}) and local index ({}) are 1-based",
                server_id, local_index
            )));
        }
        let id = match *self {
            IdScheme::ContiguousBlocks { peers_per_server } => (server_id - 1)
                .checked_mul(peers_per_server)
                .and_then(|base| base.checked_add(local_index)),
            IdScheme::OffsetPlusLocal { start_peer } => start_peer.checked_add(local_index - 1),
        };
        id.ok_or_else(|| {
            DeployError::invalid(format!(
                "global peer id overflows for server {} local index {}",
                server_id, local_index
            ))
        })
    }

    /// Global id of the first peer on the first server, the gossip rendezvous point.
    pub fn rendezvous_id(&self) -> u32 {
        match self {
            IdScheme::ContiguousBlocks { .. } => 1,
            IdScheme::OffsetPlusLocal { .. } => 0,
        }
    }

    /// Picks the scheme from the operator's flags.
    ///
    /// Without an explicit kind, `peers_per_server` alone selects contiguous
    /// blocks and anything else falls back to offset-plus-local from
    /// `start_peer` (default 0).
    pub fn resolve(
        kind: Option<IdSchemeKind>,
        start_peer: Option<u32>,
        peers_per_server: Option<u32>,
    ) -> Result<Self> {
        match (kind, start_peer, peers_per_server) {
            (Some(IdSchemeKind::ContiguousBlocks), None, Some(pps))
            | (None, None, Some(pps)) => Ok(IdScheme::ContiguousBlocks {
                peers_per_server: pps,
            }),
            (Some(IdSchemeKind::ContiguousBlocks), Some(_), _) => Err(DeployError::invalid(
                "start-peer cannot be combined with the contiguous-blocks id scheme",
            )),
            (Some(IdSchemeKind::ContiguousBlocks), None, None) => Err(DeployError::invalid(
                "the contiguous-blocks id scheme needs peers-per-server",
            )),
            (Some(IdSchemeKind::OffsetPlusLocal), _, Some(_)) => Err(DeployError::invalid(
                "peers-per-server cannot be combined with the offset-plus-local id scheme",
            )),
            (None, Some(_), Some(_)) => Err(DeployError::invalid(
                "both start-peer and peers-per-server given; pick one with --id-scheme",
            )),
            (Some(IdSchemeKind::OffsetPlusLocal), start, None) | (None, start, None) => {
                Ok(IdScheme::OffsetPlusLocal {
                    start_peer: start.unwrap_or(0),
                })
            }
        }
    }

    pub fn node(&self, server_id: u32, local_index: u32) -> Result<Node> {
        Ok(Node {
            global_id: self.global_id(server_id, local_index)?,
            server_id,
            local_index,
        })
    }
}
