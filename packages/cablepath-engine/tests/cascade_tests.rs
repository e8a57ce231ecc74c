//! Event cascade tests: raw events, termination edits, pass-through
//! fallback and full rebuilds

mod common;

use cablepath_engine::{
    CableEnd, CableId, ConsistencyController, EngineConfig, FallbackPolicy, MutationEvent,
    PathError, Preset,
};
use common::*;
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════════
// Raw events
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn raw_events_leave_index_untouched() {
    let mut site = Site::patch_panel();
    let before = site.controller.paths();

    assert!(site.delete_cable_raw(2).is_empty());
    assert_eq!(site.controller.paths(), before);

    // A rebuild catches up with the raw edit
    let changes = site.controller.rebuild_all(&site.topology).unwrap();
    assert_eq!(changes.updated.len(), 1);
    assert_eq!(changes.deleted.len(), 1);
    assert_matches_rebuild(&site.controller, &site.topology);
}

#[test]
fn raw_events_are_skipped_under_every_preset() {
    for preset in [Preset::Strict, Preset::Default, Preset::Permissive] {
        let mut site = Site::with_config(EngineConfig::preset(preset));
        site.patch_panel_into();
        let before = site.controller.paths();

        assert!(site.delete_cable_raw(2).is_empty(), "{preset:?}");
        assert_eq!(site.controller.paths(), before);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Termination edits
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn moving_cable_side_retargets_paths() {
    let mut site = Site::patch_panel();
    site.endpoint(3, "E3");
    let old_origin = path_from(&site.controller, t(1)).id;
    let far = path_from(&site.controller, t(2)).id;

    let events = site
        .topology
        .set_cable_terminations(CableId(1), CableEnd::A, &[t(3)])
        .unwrap();
    assert!(matches!(events[0], MutationEvent::TerminationDeleted(_)));
    assert!(matches!(events[1], MutationEvent::CableSaved(_)));

    let changes = site.notify_all(&events).unwrap();
    assert_eq!(changes.deleted, vec![old_origin]);
    assert_eq!(changes.updated, vec![far]);
    assert_eq!(changes.created.len(), 1);

    assert!(site.controller.find_by_origin(t(1)).is_none());
    assert_eq!(path_from(&site.controller, t(2)).destinations(), &[t(3)]);
    assert_eq!(path_from(&site.controller, t(3)).destinations(), &[t(2)]);
    assert_matches_rebuild(&site.controller, &site.topology);
}

#[test]
fn detaching_one_of_many_origins_shrinks_the_path() {
    let mut site = Site::new();
    for id in 1..=3 {
        site.endpoint(id, &format!("E{id}"));
    }
    site.connect(1, &[1, 2], &[3]);
    let shared = path_from(&site.controller, t(1)).id;

    let changes = site.detach(1).unwrap();
    assert_eq!(changes.updated.len(), 2);
    assert!(changes.deleted.is_empty());

    let path = site.controller.path(shared).unwrap();
    assert_eq!(path.origins(), &[t(2)]);
    assert_eq!(path_from(&site.controller, t(3)).destinations(), &[t(2)]);
    assert_matches_rebuild(&site.controller, &site.topology);
}

#[test]
fn removing_a_front_port_dead_ends_paths_at_it() {
    let mut site = Site::patch_panel();
    let forward = path_from(&site.controller, t(1)).id;
    let reverse = path_from(&site.controller, t(2)).id;

    let events = site.topology.remove_termination(t(10)).unwrap();
    let changes = site.notify_all(&events).unwrap();
    assert_eq!(changes.updated, vec![forward, reverse]);

    // C1 is left half-terminated
    assert_eq!(nodes(&site.controller.path(forward).unwrap()), vec![tn(1), cn(1)]);
    let reverse = site.controller.path(reverse).unwrap();
    assert!(reverse.ends_at(tn(20)));
    assert!(!reverse.is_active());
    assert_matches_rebuild(&site.controller, &site.topology);
}

#[test]
fn new_front_port_resumes_dead_end() {
    let mut site = Site::new();
    site.endpoint(1, "E1").endpoint(2, "E2").rear(20, "R1", 1);
    site.connect(2, &[20], &[2]);
    let id = path_from(&site.controller, t(2)).id;
    assert!(site.controller.path(id).unwrap().ends_at(tn(20)));

    let changes = site.front(10, "F1", 20, 1);
    assert_eq!(changes.updated, vec![id]);
    assert!(site.controller.path(id).unwrap().ends_at(tn(10)));

    site.connect(1, &[1], &[10]);
    assert_eq!(path_from(&site.controller, t(2)).destinations(), &[t(1)]);
    assert_matches_rebuild(&site.controller, &site.topology);
}

// ═══════════════════════════════════════════════════════════════════════════
// Pass-through fallback
// ═══════════════════════════════════════════════════════════════════════════

/// E2 - C2 - R1(1)/F1, with C1 (E1–F1) deleted and C3 (F1–E3) added raw:
/// the index no longer knows which cable sits on F1.
fn stale_single_position(config: EngineConfig) -> Site {
    let mut site = Site::with_config(config);
    site.patch_panel_into();
    site.endpoint(3, "E3");
    site.delete_cable_raw(1);
    site.connect_raw(3, &[10], &[3]);
    site
}

#[test]
fn fallback_finds_paths_through_paired_face() {
    let mut site = stale_single_position(EngineConfig::default());
    let from_e1 = path_from(&site.controller, t(1)).id;
    let from_e2 = path_from(&site.controller, t(2)).id;

    let changes = site.detach(10).unwrap();
    assert_eq!(changes.updated, vec![from_e2]);
    assert_eq!(changes.deleted, vec![from_e1]);

    let path = site.controller.path(from_e2).unwrap();
    assert_eq!(nodes(&path), vec![tn(2), cn(2), tn(20), tn(10)]);
    assert_index_consistent(&site.controller);
}

#[test]
fn disabled_fallback_ignores_unknown_cable() {
    let config = EngineConfig::builder()
        .pass_through_fallback(FallbackPolicy::Disabled)
        .build()
        .unwrap();
    let mut site = stale_single_position(config);
    let before = site.controller.paths();

    let changes = site.detach(10).unwrap();
    assert!(changes.is_empty());
    assert_eq!(site.controller.paths(), before);
}

/// E2 - C2 - R1(2 positions): a split path ends at R1; F1 (position 1)
/// is cabled to E1 behind the controller's back.
fn stale_fan_out(config: EngineConfig) -> Site {
    let mut site = Site::with_config(config);
    site.endpoint(1, "E1").endpoint(2, "E2").rear(20, "R1", 2);
    site.front(10, "F1", 20, 1);
    site.connect(2, &[20], &[2]);
    site.connect_raw(1, &[10], &[1]);
    site
}

#[test]
fn fan_out_fallback_is_ambiguous() {
    let mut site = stale_fan_out(EngineConfig::default());
    assert!(path_from(&site.controller, t(2)).is_split());
    let before = site.controller.paths();

    let err = site.detach(10).unwrap_err();
    assert_eq!(
        err,
        PathError::AmbiguousFallback {
            termination: t(10),
            positions: 2,
            candidates: 1,
        }
    );
    assert_eq!(site.controller.paths(), before);
}

#[test]
fn fan_out_without_candidates_is_a_no_op() {
    let mut site = Site::new();
    site.endpoint(1, "E1").rear(20, "R1", 2);
    site.front(10, "F1", 20, 1);
    site.connect_raw(1, &[10], &[1]);

    let changes = site.detach(10).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn fan_out_with_fallback_disabled_succeeds() {
    let config = EngineConfig::builder()
        .pass_through_fallback(FallbackPolicy::Disabled)
        .build()
        .unwrap();
    let mut site = stale_fan_out(config);

    let changes = site.detach(10).unwrap();
    assert!(changes.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Full rebuild
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn rebuild_keeps_ids_and_drops_stale_paths() {
    let mut site = Site::trunked_panels(2);
    let ids_before: Vec<_> = site.controller.paths().iter().map(|p| p.id).collect();

    let changes = site.controller.rebuild_all(&site.topology).unwrap();
    assert!(changes.is_empty());

    site.delete_cable_raw(11);
    let changes = site.controller.rebuild_all(&site.topology).unwrap();
    assert_eq!(changes.deleted, vec![ids_before[0]]);

    // D1 now dead-ends at FA1
    let d1 = path_from(&site.controller, t(51));
    assert!(d1.ends_at(tn(111)));
    assert!(ids_before.contains(&d1.id));
    assert_matches_rebuild(&site.controller, &site.topology);
}

#[test]
fn sequential_and_parallel_rebuilds_agree() {
    let site = Site::trunked_panels(8);
    let sequential = ConsistencyController::new(
        EngineConfig::builder().parallel_rebuild(false).build().unwrap(),
    );
    sequential.rebuild_all(&site.topology).unwrap();

    let parallel = ConsistencyController::default();
    parallel.rebuild_all(&site.topology).unwrap();

    assert_eq!(sequential.paths(), parallel.paths());
    assert_eq!(sequential.stats(), parallel.stats());
}

#[test]
fn events_serialize_for_audit() {
    let mut site = Site::patch_panel();
    let event = site.topology.delete_cable(CableId(2)).unwrap();
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"event\":\"cable_deleted\""));

    let back: MutationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
    site.notify(back).unwrap();
    assert_eq!(site.controller.path_count(), 1);
}
