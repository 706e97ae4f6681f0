//! The scene: entities, live actions and the tick that drives them.

pub mod log;
pub mod synthetic;

use ahash::AHashSet;
use glam::{Vec2, Vec4};
use serde::Serialize;

use crate::action::{Action, ActionKind, ActionTuning};
use crate::audio::{CueSink, CueTrigger};
use crate::core::config::{config, VisConfig};
use crate::core::error::Result;
use crate::core::types::{ActorId, Colour, FileId, Timestamp};
use crate::entity::registry::ring_position;
use crate::entity::{Actor, FileNode, Registry};
use crate::renderer::quads::{square_quad, GeometrySink, ImmediateCanvas};
use self::log::{LogAction, LogEntry};

const ACTOR_MARKER_COLOUR: Vec4 = Vec4::new(0.9, 0.9, 0.9, 1.0);
const GOLDEN_ANGLE: f32 = 2.399_963;

/// What one `step` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub applied: usize,
    pub completed: usize,
    /// Actions dropped because their actor or file no longer exists.
    pub dropped: usize,
    /// Files despawned after their removal finished.
    pub purged: usize,
}

/// Running totals over the scene's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub actors: usize,
    pub files: usize,
    pub live_actions: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub dropped: usize,
    pub purged: usize,
}

pub struct Scene {
    registry: Registry,
    actions: Vec<Action>,
    cues: Box<dyn CueSink>,
    config: VisConfig,
    tuning: ActionTuning,
    /// Timestamp of the first recorded entry; start delays are relative to it.
    origin: Option<Timestamp>,
    /// Spiral slot for the next new file. Never reused after a purge.
    next_file_slot: usize,
    stats: SceneStats,
}

impl Scene {
    /// A scene using the process-wide config.
    pub fn new() -> Self {
        Self::with_config(config().clone())
    }

    pub fn with_config(config: VisConfig) -> Self {
        Self {
            registry: Registry::new(),
            actions: Vec::new(),
            cues: Box::new(CueTrigger::disabled()),
            tuning: ActionTuning::from_config(&config),
            config,
            origin: None,
            next_file_slot: 0,
            stats: SceneStats::default(),
        }
    }

    /// Route cues to `cues` instead of discarding them.
    pub fn with_cues(mut self, cues: impl CueSink + 'static) -> Self {
        self.cues = Box::new(cues);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn config(&self) -> &VisConfig {
        &self.config
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            actors: self.registry.actor_count(),
            files: self.registry.file_count(),
            live_actions: self.actions.len(),
            ..self.stats
        }
    }

    /// Nothing left in flight.
    pub fn is_idle(&self) -> bool {
        self.actions.is_empty()
    }

    /// Turn a log entry into an action, spawning its actor and file on demand.
    pub fn record(&mut self, entry: &LogEntry) -> Result<(ActorId, FileId)> {
        let origin = *self.origin.get_or_insert(entry.timestamp);
        let actor = self.actor_for(&entry.user);
        let file = self.file_for(&entry.path, entry.action, entry.colour)?;

        let kind = match entry.action {
            LogAction::Add => ActionKind::Create,
            LogAction::Delete => ActionKind::Remove,
            LogAction::Modify => ActionKind::Modify {
                tint: match entry.colour {
                    Some(colour) => colour,
                    None => self.registry.file(file)?.colour,
                },
            },
        };
        let start_delay = (entry.timestamp - origin).max(0) as f32;
        self.schedule(kind, actor, file, entry.timestamp, start_delay)?;
        Ok((actor, file))
    }

    /// Build an action between existing entities and start tracking it.
    pub fn schedule(
        &mut self,
        kind: ActionKind,
        actor: ActorId,
        file: FileId,
        timestamp: Timestamp,
        start_delay: f32,
    ) -> Result<()> {
        let colour = match kind.default_colour() {
            Some(colour) => colour,
            None => self.registry.file(file)?.display_colour(),
        };
        self.registry.actor_mut(actor)?.push_pending(timestamp);

        let action = Action::with_kind(actor, file, timestamp, start_delay, kind, colour)
            .with_tuning(self.tuning);
        tracing::debug!(
            kind = kind.label(),
            %actor,
            %file,
            timestamp,
            "action scheduled"
        );
        self.actions.push(action);
        self.stats.scheduled += 1;
        Ok(())
    }

    /// Advance every live action by `dt` seconds and dispose of finished ones.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let mut report = StepReport::default();
        let mut released: Vec<ActorId> = Vec::new();
        let registry = &mut self.registry;
        let cues = self.cues.as_ref();

        self.actions.retain_mut(|action| {
            match registry.pair_mut(action.source(), action.target()) {
                Ok((actor, file)) => {
                    let outcome = action.advance(dt, actor, file, cues);
                    if outcome.applied {
                        report.applied += 1;
                    }
                    if outcome.completed {
                        report.completed += 1;
                        released.push(action.source());
                    }
                    !action.is_finished()
                }
                Err(e) => {
                    tracing::warn!(
                        kind = action.kind().label(),
                        error = %e,
                        "dropping action with dangling handle"
                    );
                    report.dropped += 1;
                    released.push(action.source());
                    false
                }
            }
        });

        for actor in released {
            if let Ok(actor) = self.registry.actor_mut(actor) {
                actor.pop_pending();
            }
        }

        report.purged = self.purge_removed_files();

        self.stats.completed += report.completed;
        self.stats.dropped += report.dropped;
        self.stats.purged += report.purged;
        report
    }

    /// Append node markers and every live beam to `sink`.
    pub fn emit_geometry(&self, sink: &mut impl GeometrySink) {
        let node_size = self.config.scene.node_size;
        for (_, file) in self.registry.files() {
            if file.is_removed() {
                continue;
            }
            sink.add_quad(square_quad(
                file.position,
                node_size,
                file.display_colour().extend(1.0),
            ));
        }
        for (_, actor) in self.registry.actors() {
            sink.add_quad(square_quad(actor.position, node_size, ACTOR_MARKER_COLOUR));
        }
        for action in &self.actions {
            let (Ok(actor), Ok(file)) = (
                self.registry.actor(action.source()),
                self.registry.file(action.target()),
            ) else {
                continue;
            };
            action.emit_geometry(actor, file, sink);
        }
    }

    /// Draw only the beams through an immediate-mode canvas.
    pub fn draw_immediate(&self, canvas: &mut impl ImmediateCanvas) {
        for action in &self.actions {
            let (Ok(actor), Ok(file)) = (
                self.registry.actor(action.source()),
                self.registry.file(action.target()),
            ) else {
                continue;
            };
            action.draw_immediate(actor, file, canvas);
        }
    }

    /// Bounding box of every node, for fitting the camera.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let positions = self
            .registry
            .actors()
            .map(|(_, a)| a.position)
            .chain(self.registry.files().map(|(_, f)| f.position));
        positions.fold(None, |bounds, p| match bounds {
            None => Some((p, p)),
            Some((min, max)) => Some((min.min(p), max.max(p))),
        })
    }

    fn actor_for(&mut self, name: &str) -> ActorId {
        if let Some(id) = self.registry.find_actor(name) {
            return id;
        }
        let id = self.registry.spawn_actor(Actor::new(name, Vec2::ZERO));
        self.layout_actors();
        tracing::debug!(name, %id, "actor joined");
        id
    }

    fn file_for(&mut self, path: &str, action: LogAction, colour: Option<Colour>) -> Result<FileId> {
        if let Some(id) = self.registry.find_file(path) {
            let file = self.registry.file_mut(id)?;
            // A new add or modify for a file whose removal has landed brings it back.
            if action != LogAction::Delete && file.is_removed() {
                file.removed_at = None;
            }
            return Ok(id);
        }
        let slot = self.next_file_slot;
        self.next_file_slot += 1;
        let mut node = FileNode::new(
            path,
            spiral_position(slot, self.config.scene.file_size * 2.0),
            self.config.scene.file_size,
        );
        if let Some(colour) = colour {
            node.colour = colour;
        }
        Ok(self.registry.spawn_file(node))
    }

    fn layout_actors(&mut self) {
        let count = self.registry.actor_count();
        let radius = self.config.scene.actor_radius;
        let ids: Vec<ActorId> = self.registry.actors().map(|(id, _)| id).collect();
        for (slot, id) in ids.into_iter().enumerate() {
            if let Ok(actor) = self.registry.actor_mut(id) {
                actor.position = ring_position(slot, count, radius);
            }
        }
    }

    fn purge_removed_files(&mut self) -> usize {
        let in_flight: AHashSet<FileId> = self.actions.iter().map(|a| a.target()).collect();
        let doomed: Vec<FileId> = self
            .registry
            .files()
            .filter(|(id, file)| file.is_removed() && !in_flight.contains(id))
            .map(|(id, _)| id)
            .collect();

        let mut purged = 0;
        for id in doomed {
            match self.registry.despawn_file(id) {
                Ok(file) => {
                    tracing::debug!(path = %file.path, "file purged");
                    purged += 1;
                }
                Err(e) => tracing::warn!(error = %e, "failed to purge file"),
            }
        }
        purged
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Sunflower spiral placement for the `slot`-th file.
fn spiral_position(slot: usize, spacing: f32) -> Vec2 {
    let r = spacing * (slot as f32).sqrt();
    let theta = slot as f32 * GOLDEN_ANGLE;
    Vec2::new(theta.cos(), theta.sin()) * r
}
