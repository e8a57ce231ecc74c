//! Termination Graph Accessor port
//!
//! Read-only view over terminations and cables. The tracer and the
//! consistency controller inspect topology exclusively through this trait;
//! whoever applies a mutation must make it visible here before notifying
//! the controller.

use crate::features::termination_graph::domain::{Cable, CableEnd, PositionMapping, Termination};
use crate::shared::models::{CableId, TerminationId};

pub trait TerminationGraph {
    fn termination(&self, id: TerminationId) -> Option<&Termination>;

    fn cable(&self, id: CableId) -> Option<&Cable>;

    /// Front ports mapped onto `rear_port`, ordered by position
    fn front_ports(&self, rear_port: TerminationId) -> Vec<&Termination>;

    /// Every cable, ordered by id
    fn cables(&self) -> Vec<&Cable>;

    /// Front port mapped onto `position` of `rear_port`, if any
    fn front_port_at(&self, rear_port: TerminationId, position: u16) -> Option<&Termination> {
        let wanted = PositionMapping::ToRear {
            rear_port,
            position,
        };
        self.front_ports(rear_port)
            .into_iter()
            .find(|t| t.kind.linked_positions() == wanted)
    }

    /// Origin sets of every traceable path: for each cable side holding
    /// endpoints, the endpoint terminations on that side.
    fn origin_sets(&self) -> Vec<Vec<TerminationId>> {
        let mut sets = Vec::new();
        for cable in self.cables() {
            for end in [CableEnd::A, CableEnd::B] {
                let endpoints: Vec<TerminationId> = cable
                    .terminations(end)
                    .iter()
                    .copied()
                    .filter(|id| {
                        self.termination(*id)
                            .map(|t| t.is_origin_capable())
                            .unwrap_or(false)
                    })
                    .collect();
                if !endpoints.is_empty() {
                    sets.push(endpoints);
                }
            }
        }
        sets
    }
}
