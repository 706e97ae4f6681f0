//! Actor nodes: the users whose events spawn actions.

use glam::Vec2;

use super::ActionSource;
use crate::core::types::Timestamp;

/// An actor in the scene.
#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub position: Vec2,
    /// Actions spawned by this actor that are still in flight.
    pending: usize,
    /// Timestamp of the most recent event attributed to this actor.
    pub last_action: Option<Timestamp>,
}

impl Actor {
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            pending: 0,
            last_action: None,
        }
    }

    /// Register a newly scheduled action.
    pub fn push_pending(&mut self, timestamp: Timestamp) {
        self.pending += 1;
        self.last_action = Some(self.last_action.map_or(timestamp, |t| t.max(timestamp)));
    }

    /// Release a finished (or dropped) action.
    pub fn pop_pending(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub fn is_idle(&self) -> bool {
        self.pending == 0
    }
}

impl ActionSource for Actor {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn pending_action_count(&self) -> usize {
        self.pending
    }
}
