//! Custom assertions over the path index

use cablepath_engine::{
    CablePath, ConsistencyController, PathNode, TerminationId, Topology, TracedPath,
};

pub fn nodes(path: &CablePath) -> Vec<PathNode> {
    path.nodes().collect()
}

pub fn path_from(controller: &ConsistencyController, origin: TerminationId) -> CablePath {
    controller
        .find_by_origin(origin)
        .unwrap_or_else(|| panic!("expected a path originating at {origin}"))
}

/// Assert that the reverse index agrees with the stored paths
pub fn assert_index_consistent(controller: &ConsistencyController) {
    if let Err(problems) = controller.index().check_consistency() {
        panic!("reverse index out of sync: {problems}");
    }
}

/// Assert that the incrementally maintained index equals a full rebuild
pub fn assert_matches_rebuild(controller: &ConsistencyController, topology: &Topology) {
    assert_index_consistent(controller);

    let fresh = ConsistencyController::new(controller.config().clone());
    fresh.rebuild_all(topology).unwrap();

    assert_eq!(
        traces_by_origin(controller),
        traces_by_origin(&fresh),
        "incremental index diverged from a full rebuild"
    );
}

fn traces_by_origin(controller: &ConsistencyController) -> Vec<TracedPath> {
    let mut traces: Vec<TracedPath> = controller.paths().into_iter().map(|p| p.trace).collect();
    traces.sort_by(|a, b| a.origins.cmp(&b.origins));
    traces
}
