//! Actors, files and the registry that owns them.
//!
//! Actions never own the entities they connect. They hold `ActorId` /
//! `FileId` handles and talk to the resolved entities through the
//! `ActionSource` and `ActionTarget` traits.

pub mod actor;
pub mod file;
pub mod registry;

pub use actor::Actor;
pub use file::FileNode;
pub use registry::Registry;

use glam::Vec2;

use crate::core::types::{Colour, Timestamp};

/// What an action reads from its originating actor.
pub trait ActionSource {
    /// Current position in world space.
    fn position(&self) -> Vec2;

    /// Number of actions on this actor that have not finished yet.
    fn pending_action_count(&self) -> usize;
}

/// What an action reads from and does to the entity it affects.
pub trait ActionTarget {
    /// Position in world space (after any parent offsets).
    fn absolute_position(&self) -> Vec2;

    /// Visual size; sets the beam half-width at the target end.
    fn size(&self) -> f32;

    /// Mark the entity as affected by an event at `timestamp`.
    fn touch(&mut self, timestamp: Timestamp, colour: Colour);

    /// Begin removing the entity as of `timestamp`.
    fn remove(&mut self, timestamp: Timestamp);

    /// Replace the entity's own colour.
    fn set_colour(&mut self, colour: Colour);
}
