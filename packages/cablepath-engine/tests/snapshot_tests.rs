//! Topology snapshots: loading from disk, capture, and warm starts

mod common;

use std::io::Write;

use cablepath_engine::{
    CableId, CablePath, ConsistencyController, EngineConfig, PathIndex, TopologyError,
    TopologySnapshot,
};
use common::*;
use pretty_assertions::assert_eq;

const SITE_YAML: &str = r#"
terminations:
  - { id: 1, name: eth0, kind: { endpoint: interface } }
  - { id: 2, name: eth1, kind: { endpoint: interface } }
  - { id: 20, name: rear1, kind: { rear_port: { positions: 1 } } }
  - { id: 10, name: front1, kind: { front_port: { rear_port: 20, rear_port_position: 1 } } }
cables:
  - { id: 1, a: [1], b: [10] }
  - { id: 2, a: [20], b: [2], label: uplink }
"#;

fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn yaml_snapshot_traces_like_incremental_build() {
    let file = write_temp(SITE_YAML, ".yaml");
    let topology = TopologySnapshot::from_path(file.path())
        .unwrap()
        .into_topology()
        .unwrap();

    let controller = ConsistencyController::default();
    controller.rebuild_all(&topology).unwrap();

    let incremental = Site::patch_panel();
    assert_eq!(
        controller.paths().into_iter().map(|p| p.trace).collect::<Vec<_>>(),
        incremental.controller.paths().into_iter().map(|p| p.trace).collect::<Vec<_>>()
    );
}

#[test]
fn captured_snapshot_reloads_as_json() {
    let site = Site::trunked_panels(2);
    let json = TopologySnapshot::capture(&site.topology).to_json().unwrap();
    let file = write_temp(&json, ".json");

    let reloaded = TopologySnapshot::from_path(file.path())
        .unwrap()
        .into_topology()
        .unwrap();
    assert_eq!(reloaded.termination_count(), site.topology.termination_count());
    assert_eq!(reloaded.cable_count(), site.topology.cable_count());
    assert_matches_rebuild(&site.controller, &reloaded);
}

#[test]
fn snapshot_rejects_double_cabled_termination() {
    let yaml = r#"
terminations:
  - { id: 1, kind: { endpoint: interface } }
  - { id: 2, kind: { endpoint: interface } }
  - { id: 3, kind: { endpoint: interface } }
cables:
  - { id: 1, a: [1], b: [2] }
  - { id: 2, a: [1], b: [3] }
"#;
    let err = TopologySnapshot::from_yaml_str(yaml)
        .unwrap()
        .into_topology()
        .unwrap_err();
    assert!(matches!(err, TopologyError::AlreadyCabled { .. }));
}

#[test]
fn warm_start_from_exported_index() {
    let mut site = Site::patch_panel();
    let exported = serde_json::to_string(&site.controller.paths()).unwrap();

    let restored = ConsistencyController::with_index(
        EngineConfig::default(),
        PathIndex::from_paths(serde_json::from_str::<Vec<CablePath>>(&exported).unwrap()),
    );
    assert_eq!(restored.paths(), site.controller.paths());
    assert_index_consistent(&restored);

    // Both controllers see the same events from here on
    let deleted = site.topology.delete_cable(CableId(2)).unwrap();
    let resumed = restored.handle(&site.topology, &deleted).unwrap();
    assert_eq!(site.notify(deleted).unwrap(), resumed);
    assert_eq!(resumed.deleted.len(), 1);

    let reconnected = site.topology.connect(CableId(3), &[t(20)], &[t(2)]).unwrap();
    let resumed = restored.handle(&site.topology, &reconnected).unwrap();
    assert_eq!(site.notify(reconnected).unwrap(), resumed);

    // Ids allocated after the restore never collide with restored ones
    assert_eq!(resumed.created.len(), 1);
    assert!(resumed.created[0].0 > 2);
    assert_eq!(restored.paths(), site.controller.paths());
    assert_matches_rebuild(&restored, &site.topology);
}
