//! Infrastructure - Index storage and staging

pub mod index;
pub mod transaction;

pub use index::PathIndex;
pub use transaction::{IndexTransaction, StagedChanges};
