/*
 * Cablepath Engine - Cable path tracing and consistency
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Identifiers (TerminationId, CableId, PathId, PathNode)
 * - features/    : Vertical slices (termination_graph → path_tracer → path_index → consistency)
 * - config/      : EngineConfig, presets, YAML v1
 *
 * Flow:
 * - a topology edit is applied, then reported as a typed MutationEvent
 * - the ConsistencyController retraces affected paths in one staged cascade
 * - the committed PathChangeSet is handed to persistence
 */

// Crate-level lint configuration
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::len_without_is_empty)] // PathChangeSet::len is a summary count

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared identifiers
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{EngineConfig, FallbackPolicy, Preset};
pub use errors::{EngineError, Result};
pub use features::consistency::{ConsistencyController, MutationEvent, PathChangeSet};
pub use features::path_index::{CablePath, IndexStats, IndexTransaction, PathIndex};
pub use features::path_tracer::{PathError, PathResult, PathTracer, TracedPath};
pub use features::termination_graph::{
    Cable, CableEnd, EndpointKind, LinkStatus, Termination, TerminationGraph, TerminationKind,
    Topology, TopologyError, TopologySnapshot,
};
pub use shared::models::{CableId, PathId, PathNode, TerminationId};
