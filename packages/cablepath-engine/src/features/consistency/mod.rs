/*
 * Consistency
 *
 * Keeps the path index consistent with the physical topology as cables,
 * terminations and pass-through elements change.
 *
 * Architecture:
 * - Domain: MutationEvent (CableSaved, CableDeleted, TerminationDeleted,
 *   PassThroughCreated), PathChangeSet
 * - Application: ConsistencyController (event dispatch, retrace cascade,
 *   full rebuild)
 *
 * Events are serialized: each holds the index write lock for its whole
 * cascade and commits atomically.
 */

pub mod application;
pub mod domain;

pub use application::ConsistencyController;
pub use domain::{
    CableDeleted, CableSaved, MutationEvent, PassThroughCreated, PathChangeSet, TerminationDeleted,
};
