//! Typed mutation events
//!
//! One event per topology-affecting edit. Each carries the state the
//! controller needs to classify the edit (prior and new cable state, the
//! last state of a removed termination) and a `raw` flag for bulk/import
//! sourced edits, which the controller skips.

use serde::{Deserialize, Serialize};

use crate::features::termination_graph::domain::{Cable, LinkStatus, Termination};
use crate::shared::models::CableId;

/// Cable created or updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableSaved {
    /// State before the save (`None` on creation)
    pub previous: Option<Cable>,
    /// State after the save
    pub current: Cable,
    #[serde(default)]
    pub raw: bool,
}

impl CableSaved {
    pub fn created(&self) -> bool {
        self.previous.is_none()
    }

    /// Whether the termination sets changed with this save
    pub fn terminations_modified(&self) -> bool {
        if self.current.dirty {
            return true;
        }
        match &self.previous {
            None => true,
            Some(previous) => !previous.same_terminations(&self.current),
        }
    }

    /// `(old, new)` when the status changed with this save
    pub fn status_change(&self) -> Option<(LinkStatus, LinkStatus)> {
        let previous = self.previous.as_ref()?;
        (previous.status != self.current.status).then_some((previous.status, self.current.status))
    }
}

/// Cable deleted; `cable` is its last state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableDeleted {
    pub cable: Cable,
    #[serde(default)]
    pub raw: bool,
}

/// A termination was detached from `cable`
///
/// `termination` is its state before the detachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationDeleted {
    pub termination: Termination,
    pub cable: CableId,
    #[serde(default)]
    pub raw: bool,
}

/// A front port was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassThroughCreated {
    pub front_port: Termination,
    #[serde(default)]
    pub raw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MutationEvent {
    CableSaved(CableSaved),
    CableDeleted(CableDeleted),
    TerminationDeleted(TerminationDeleted),
    PassThroughCreated(PassThroughCreated),
}

impl MutationEvent {
    pub fn is_raw(&self) -> bool {
        match self {
            MutationEvent::CableSaved(e) => e.raw,
            MutationEvent::CableDeleted(e) => e.raw,
            MutationEvent::TerminationDeleted(e) => e.raw,
            MutationEvent::PassThroughCreated(e) => e.raw,
        }
    }

    /// Mark as bulk/import sourced
    pub fn into_raw(mut self) -> Self {
        match &mut self {
            MutationEvent::CableSaved(e) => e.raw = true,
            MutationEvent::CableDeleted(e) => e.raw = true,
            MutationEvent::TerminationDeleted(e) => e.raw = true,
            MutationEvent::PassThroughCreated(e) => e.raw = true,
        }
        self
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MutationEvent::CableSaved(e) if e.created() => "cable_created",
            MutationEvent::CableSaved(_) => "cable_updated",
            MutationEvent::CableDeleted(_) => "cable_deleted",
            MutationEvent::TerminationDeleted(_) => "termination_deleted",
            MutationEvent::PassThroughCreated(_) => "pass_through_created",
        }
    }

    /// Id of the mutated entity, for log lines
    pub fn subject(&self) -> String {
        match self {
            MutationEvent::CableSaved(e) => e.current.id.to_string(),
            MutationEvent::CableDeleted(e) => e.cable.id.to_string(),
            MutationEvent::TerminationDeleted(e) => e.termination.id.to_string(),
            MutationEvent::PassThroughCreated(e) => e.front_port.id.to_string(),
        }
    }
}
