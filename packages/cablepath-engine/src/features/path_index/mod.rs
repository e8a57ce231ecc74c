/*
 * Path Index
 *
 * Stores traced paths under stable ids with a reverse map from every node
 * (termination or cable) to the paths containing it.
 *
 * Architecture:
 * - Domain: CablePath, PathChangeSet, IndexStats
 * - Infrastructure: PathIndex, IndexTransaction (overlay staging)
 *
 * Mutations made while handling one event go through an IndexTransaction
 * and are committed in one step; an abandoned transaction changes nothing.
 */

pub mod domain;
pub mod infrastructure;

pub use domain::{CablePath, IndexStats, PathChangeSet};
pub use infrastructure::{IndexTransaction, PathIndex, StagedChanges};
