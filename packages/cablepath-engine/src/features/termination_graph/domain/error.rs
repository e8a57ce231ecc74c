//! Error types for topology edits

use thiserror::Error;

use crate::shared::models::{CableId, TerminationId};

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Duplicate termination: {0}")]
    DuplicateTermination(TerminationId),

    #[error("Duplicate cable: {0}")]
    DuplicateCable(CableId),

    #[error("Unknown termination: {0}")]
    UnknownTermination(TerminationId),

    #[error("Unknown cable: {0}")]
    UnknownCable(CableId),

    #[error("{termination} is already attached to {cable}")]
    AlreadyCabled {
        termination: TerminationId,
        cable: CableId,
    },

    #[error("{0} is not attached to any cable")]
    NotCabled(TerminationId),

    #[error("{termination} appears on both sides of {cable}")]
    OverlappingSides {
        cable: CableId,
        termination: TerminationId,
    },

    #[error("{0} has no terminations on either side")]
    EmptyCable(CableId),

    #[error("{0} is not a rear port")]
    NotARearPort(TerminationId),

    #[error("Position {position} of {rear_port} is out of range 1..={positions}")]
    InvalidPosition {
        rear_port: TerminationId,
        position: u16,
        positions: u16,
    },

    #[error("Position {position} of {rear_port} is already mapped to {front_port}")]
    PositionOccupied {
        rear_port: TerminationId,
        position: u16,
        front_port: TerminationId,
    },

    #[error("{rear_port} still has {front_ports} front port(s) mapped onto it")]
    RearPortInUse {
        rear_port: TerminationId,
        front_ports: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON snapshot error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML snapshot error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type TopologyResult<T> = Result<T, TopologyError>;
