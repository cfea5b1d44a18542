use crate::common::cluster::IdSchemeKind;
use crate::common::config::DEFAULT_CONFIG_PATH;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fabric-deploy-gen")]
#[command(about = "Topology and compose generator for multi-server Fabric test clusters", version)]
pub struct Cli {
    /// Optional config file layered under FABRIC_DEPLOY__* variables and flags.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assign every node a host:port and write the shared topology file
    Topology(TopologyArgs),
    /// Write this server's compose file
    Compose(ComposeArgs),
    /// Parse a benchmark log and upload the result to the metrics store
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub struct TopologyArgs {
    #[arg(long, default_value_t = 15)]
    pub nodes: u32,

    #[arg(long, default_value_t = 3)]
    pub servers: u32,

    /// Server address, once per server in order; missing ones are loopback.
    #[arg(long = "host")]
    pub hosts: Vec<String>,

    #[arg(long)]
    pub base_port: Option<u16>,

    #[arg(long)]
    pub output: Option<String>,
}

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Number of peers on this server.
    #[arg(long, default_value_t = 3)]
    pub peers: u32,

    /// 1-based id of this server.
    #[arg(long, default_value_t = 1)]
    pub server: u32,

    /// Global id of this server's first peer (offset-plus-local).
    #[arg(long)]
    pub start_peer: Option<u32>,

    /// Block size per server (contiguous-blocks).
    #[arg(long)]
    pub peers_per_server: Option<u32>,

    #[arg(long)]
    pub id_scheme: Option<IdSchemeKind>,

    #[arg(long)]
    pub base_peer_port: Option<u16>,

    #[arg(long)]
    pub base_db_port: Option<u16>,

    #[arg(long)]
    pub port_stride: Option<u32>,

    #[arg(long)]
    pub orderer_server: Option<u32>,

    /// Gossip bootstrap address as host:port, e.g. peer3.org1.example.com:9051.
    #[arg(long)]
    pub bootstrap_peer: Option<String>,

    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    pub log_file: PathBuf,

    /// Label for the run, e.g. "proposed" or "vanilla".
    pub fabric_version: String,

    #[arg(long)]
    pub store_url: Option<String>,

    #[arg(long)]
    pub database: Option<String>,
}
