use clap::Parser;
use fabric_deploy_gen::cli::args::{Cli, Command};
use fabric_deploy_gen::cli::commands::{run_compose, run_topology};
use fabric_deploy_gen::common::cluster::{IdScheme, IdSchemeKind};
use fabric_deploy_gen::common::config::{DeployConfig, load_deploy_config};
use std::fs;

#[test]
fn id_scheme_follows_the_flags_given() {
    assert_eq!(
        IdScheme::resolve(None, None, None).unwrap(),
        IdScheme::OffsetPlusLocal { start_peer: 0 }
    );
    assert_eq!(
        IdScheme::resolve(None, Some(5), None).unwrap(),
        IdScheme::OffsetPlusLocal { start_peer: 5 }
    );
    assert_eq!(
        IdScheme::resolve(None, None, Some(5)).unwrap(),
        IdScheme::ContiguousBlocks { peers_per_server: 5 }
    );
    assert!(IdScheme::resolve(None, Some(1), Some(5)).unwrap_err().is_invalid_argument());
    assert!(
        IdScheme::resolve(Some(IdSchemeKind::ContiguousBlocks), None, None)
            .unwrap_err()
            .is_invalid_argument()
    );
    assert!(
        IdScheme::resolve(Some(IdSchemeKind::OffsetPlusLocal), None, Some(5))
            .unwrap_err()
            .is_invalid_argument()
    );
}

#[test]
fn compose_flags_parse() {
    let cli = Cli::try_parse_from([
        "fabric-deploy-gen",
        "compose",
        "--peers",
        "5",
        "--server",
        "2",
        "--id-scheme",
        "contiguous-blocks",
        "--peers-per-server",
        "5",
    ])
    .unwrap();
    match cli.command {
        Command::Compose(args) => {
            assert_eq!(args.peers, 5);
            assert_eq!(args.server, 2);
            assert_eq!(args.id_scheme, Some(IdSchemeKind::ContiguousBlocks));
            assert_eq!(args.peers_per_server, Some(5));
            assert_eq!(args.start_peer, None);
        }
        other => panic!("parsed as {:?}", other),
    }

    assert!(
        Cli::try_parse_from(["fabric-deploy-gen", "compose", "--id-scheme", "random"]).is_err()
    );
}

#[test]
fn topology_command_writes_cluster_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cluster.json");
    let cli = Cli::try_parse_from([
        "fabric-deploy-gen",
        "topology",
        "--nodes",
        "15",
        "--servers",
        "3",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let Command::Topology(args) = cli.command else {
        panic!("expected topology command");
    };

    let path = run_topology(&args, &DeployConfig::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    let peers = json["peers"].as_object().unwrap();
    assert_eq!(peers.len(), 15);
    assert_eq!(peers["15"], "127.0.0.1:7015");
}

#[test]
fn uneven_topology_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cluster.json");
    let cli = Cli::try_parse_from([
        "fabric-deploy-gen",
        "topology",
        "--nodes",
        "10",
        "--servers",
        "3",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let Command::Topology(args) = cli.command else {
        panic!("expected topology command");
    };
    assert!(run_topology(&args, &DeployConfig::default()).is_err());
    assert!(!output.exists());
}

#[test]
fn compose_command_writes_server_file() {
    let dir = tempfile::tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "fabric-deploy-gen",
        "compose",
        "--peers",
        "2",
        "--server",
        "3",
        "--start-peer",
        "10",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();
    let Command::Compose(args) = cli.command else {
        panic!("expected compose command");
    };

    let path = run_compose(&args, &DeployConfig::default()).unwrap();
    assert_eq!(path, dir.path().join("docker-compose-server3.yaml"));
    let yaml: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let services = yaml["services"].as_mapping().unwrap();
    assert_eq!(services.len(), 4);
    assert!(yaml["services"]["peer11.org1.example.com"].is_mapping());
    assert!(yaml["services"]["orderer.example.com"].is_null());
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deploy.toml");
    fs::write(
        &path,
        r#"
[compose]
base_peer_port = 9051
peers_per_server = 4

[profile]
network = "bench_net"

[store]
database = "bench_results"
"#,
    )
    .unwrap();

    let config = load_deploy_config(path.to_str().unwrap()).unwrap();
    assert_eq!(config.compose.base_peer_port, 9051);
    assert_eq!(config.compose.base_db_port, 5984);
    assert_eq!(config.compose.peers_per_server, Some(4));
    assert_eq!(config.profile.network, "bench_net");
    assert_eq!(config.profile.domain, "org1.example.com");
    assert_eq!(config.store.database, "bench_results");
    assert_eq!(config.topology.base_port, 7000);
}

#[test]
fn absent_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_deploy_config(dir.path().join("nope.toml").to_str().unwrap()).unwrap();
    assert_eq!(config.compose.port_stride, 1000);
    assert_eq!(config.store.url, "http://127.0.0.1:5984");
}

#[test]
fn environment_overrides_file_and_splits_host_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deploy.toml");
    fs::write(&path, "[store]\nuser = \"file_user\"\n").unwrap();

    // Values agree with what the other config tests in this binary expect,
    // since they may run while these are set.
    unsafe {
        std::env::set_var("FABRIC_DEPLOY__TOPOLOGY__HOSTS", "10.0.0.1,10.0.0.2");
        std::env::set_var("FABRIC_DEPLOY__COMPOSE__BASE_PEER_PORT", "9051");
        std::env::set_var("FABRIC_DEPLOY__STORE__USER", "bench");
    }
    let config = load_deploy_config(path.to_str().unwrap());
    unsafe {
        std::env::remove_var("FABRIC_DEPLOY__TOPOLOGY__HOSTS");
        std::env::remove_var("FABRIC_DEPLOY__COMPOSE__BASE_PEER_PORT");
        std::env::remove_var("FABRIC_DEPLOY__STORE__USER");
    }

    let config = config.unwrap();
    assert_eq!(config.topology.hosts, vec!["10.0.0.1", "10.0.0.2"]);
    assert_eq!(config.compose.base_peer_port, 9051);
    assert_eq!(config.store.user, "bench");
    assert_eq!(config.compose.port_stride, 1000);
}
