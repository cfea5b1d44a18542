use fabric_deploy_gen::assign_topology;
use fabric_deploy_gen::generator::topology::{PortPolicy, TopologyFile, TopologyRequest};
use std::collections::HashSet;

fn request(total_nodes: u32, server_count: u32, hosts: &[&str]) -> TopologyRequest {
    TopologyRequest {
        total_nodes,
        server_count,
        hosts: hosts.iter().map(|h| h.to_string()).collect(),
        base_port: 7000,
    }
}

#[test]
fn loopback_cluster_uses_global_ports() {
    let topology =
        assign_topology(&request(15, 3, &["127.0.0.1", "127.0.0.1", "127.0.0.1"])).unwrap();
    assert_eq!(topology.policy(), PortPolicy::Global);

    let ports: Vec<u16> = topology
        .assignments()
        .iter()
        .map(|a| a.endpoint.port())
        .collect();
    assert_eq!(ports, (7001..=7015).collect::<Vec<u16>>());

    let ids: Vec<u32> = topology
        .assignments()
        .iter()
        .map(|a| a.node.global_id)
        .collect();
    assert_eq!(ids, (1..=15).collect::<Vec<u32>>());
}

#[test]
fn missing_hosts_default_to_loopback() {
    let topology = assign_topology(&request(6, 3, &[])).unwrap();
    assert_eq!(topology.policy(), PortPolicy::Global);
    assert!(
        topology
            .assignments()
            .iter()
            .all(|a| a.endpoint.host() == "127.0.0.1")
    );

    let empty = assign_topology(&request(6, 3, &["", ""])).unwrap();
    assert_eq!(empty.policy(), PortPolicy::Global);

    assert!(
        assign_topology(&request(6, 3, &["  "]))
            .unwrap_err()
            .is_invalid_argument()
    );
}

#[test]
fn hosts_are_compared_exactly() {
    // " 10.0.0.1" is a different entry from "10.0.0.1", so block-local
    // ports would land twice on the same address.
    let err = assign_topology(&request(4, 2, &[" 10.0.0.1", "10.0.0.1"])).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn distinct_hosts_reuse_block_local_ports() {
    let topology =
        assign_topology(&request(15, 3, &["10.0.0.1", "10.0.0.2", "10.0.0.3"])).unwrap();
    assert_eq!(topology.policy(), PortPolicy::BlockLocal);

    let file = topology.to_file();
    assert_eq!(file.peers[&1], "10.0.0.1:7001");
    assert_eq!(file.peers[&5], "10.0.0.1:7005");
    assert_eq!(file.peers[&6], "10.0.0.2:7001");
    assert_eq!(file.peers[&15], "10.0.0.3:7005");

    let pairs: HashSet<(String, u16)> = topology
        .assignments()
        .iter()
        .map(|a| (a.endpoint.host().to_string(), a.endpoint.port()))
        .collect();
    assert_eq!(pairs.len(), 15);
}

#[test]
fn every_divisible_split_yields_unique_ids_and_ports() {
    for servers in 1..=6u32 {
        for per_server in 1..=8u32 {
            let total = servers * per_server;
            let same = assign_topology(&request(total, servers, &[])).unwrap();
            let ids: HashSet<u32> = same.assignments().iter().map(|a| a.node.global_id).collect();
            let ports: HashSet<u16> = same.assignments().iter().map(|a| a.endpoint.port()).collect();
            assert_eq!(ids.len(), total as usize);
            assert_eq!(ports.len(), total as usize);

            let hosts: Vec<String> = (1..=servers).map(|i| format!("10.1.0.{}", i)).collect();
            let host_refs: Vec<&str> = hosts.iter().map(String::as_str).collect();
            let spread = assign_topology(&request(total, servers, &host_refs)).unwrap();
            let pairs: HashSet<String> = spread
                .assignments()
                .iter()
                .map(|a| a.endpoint.to_string())
                .collect();
            assert_eq!(pairs.len(), total as usize);
        }
    }
}

#[test]
fn server_plans_cover_contiguous_blocks() {
    let topology = assign_topology(&request(12, 3, &[])).unwrap();
    let plans = topology.server_plans();
    assert_eq!(plans.len(), 3);
    assert_eq!((plans[0].start_peer, plans[0].peers), (1, 4));
    assert_eq!((plans[1].start_peer, plans[1].peers), (5, 4));
    assert_eq!((plans[2].start_peer, plans[2].peers), (9, 4));
    assert_eq!(plans[2].server_id, 3);
}

#[test]
fn uneven_partition_is_rejected() {
    let err = assign_topology(&request(10, 3, &[])).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("equal server blocks"));
}

#[test]
fn zero_counts_are_rejected() {
    assert!(assign_topology(&request(0, 3, &[])).unwrap_err().is_invalid_argument());
    assert!(assign_topology(&request(3, 0, &[])).unwrap_err().is_invalid_argument());
}

#[test]
fn too_many_hosts_are_rejected() {
    let err = assign_topology(&request(4, 2, &["a", "b", "c"])).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn partially_shared_host_is_rejected() {
    let err = assign_topology(&request(6, 3, &["10.0.0.1", "10.0.0.1", "10.0.0.2"])).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn port_overflow_is_rejected() {
    let mut req = request(10, 1, &[]);
    req.base_port = 65530;
    assert!(assign_topology(&req).unwrap_err().is_invalid_argument());
}

#[test]
fn oversized_counts_are_rejected_before_assignment() {
    let err = assign_topology(&request(4_000_000_000, 1, &[])).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("above 65535"));

    let err = assign_topology(&request(4_000_000_000, 4_000_000_000, &[])).unwrap_err();
    assert!(err.is_invalid_argument());

    // block-local ports fit, but every padded server would share loopback
    let err = assign_topology(&request(4_000_000_000, 2_000_000_000, &["10.0.0.1"])).unwrap_err();
    assert!(err.is_invalid_argument());

    let mut req = request(30, 3, &["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    req.base_port = 65525;
    assert_eq!(assign_topology(&req).unwrap().policy(), PortPolicy::BlockLocal);
}

#[test]
fn topology_file_round_trips_with_string_keys() {
    let topology = assign_topology(&request(4, 2, &[])).unwrap();
    let json = topology.to_json().unwrap();
    let raw: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(raw["peers"]["3"], "127.0.0.1:7003");

    let parsed: TopologyFile = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, topology.to_file());
    assert_eq!(parsed.peers.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}
