//! Actions: animated events flowing from an actor to a file.
//!
//! An action is Pending from construction until its progress reaches 1.0,
//! then Finished for good. On its first advancing tick it applies a
//! one-time effect chosen by its `ActionKind`; a remove additionally
//! removes its target on the tick it finishes.

pub mod geometry;

use glam::Vec3;

use crate::audio::{Cue, CueSink};
use crate::core::config::VisConfig;
use crate::core::types::{ActorId, Colour, FileId, Timestamp};
use crate::entity::{ActionSource, ActionTarget};
use crate::renderer::quads::{draw_quad, GeometrySink, ImmediateCanvas, QuadVertex};
use geometry::{beam_quad, BeamStyle};

pub const CREATE_COLOUR: Colour = Vec3::new(0.0, 1.0, 0.0);
pub const REMOVE_COLOUR: Colour = Vec3::new(1.0, 0.0, 0.0);
pub const MODIFY_COLOUR: Colour = Vec3::new(1.0, 0.7, 0.3);

/// What an action does when it first activates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionKind {
    /// Plain touch of the target with the action colour.
    Touch,
    /// Announced by a high cue only; the target is not touched.
    Create,
    /// Low cue on apply, target removed when the beam lands.
    Remove,
    /// Touch, recolour the target to `tint`, mid cue.
    Modify { tint: Colour },
}

impl ActionKind {
    /// Conventional beam colour for this kind. `Touch` has none.
    pub fn default_colour(&self) -> Option<Colour> {
        match self {
            ActionKind::Touch => None,
            ActionKind::Create => Some(CREATE_COLOUR),
            ActionKind::Remove => Some(REMOVE_COLOUR),
            ActionKind::Modify { .. } => Some(MODIFY_COLOUR),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Touch => "touch",
            ActionKind::Create => "create",
            ActionKind::Remove => "remove",
            ActionKind::Modify { .. } => "modify",
        }
    }
}

/// Per-action constants, copied out of the config at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionTuning {
    pub rate: f32,
    pub max_rate: f32,
    pub style: BeamStyle,
    pub cue_duration: f32,
    pub create_pitch: f32,
    pub remove_pitch: f32,
    pub modify_pitch: f32,
}

impl ActionTuning {
    pub fn from_config(config: &VisConfig) -> Self {
        Self {
            rate: config.action.base_rate,
            max_rate: config.action.max_rate,
            style: BeamStyle {
                source_width_factor: config.action.source_width_factor,
                tail_alpha_factor: config.action.tail_alpha_factor,
            },
            cue_duration: config.audio.cue_duration,
            create_pitch: config.audio.create_pitch,
            remove_pitch: config.audio.remove_pitch,
            modify_pitch: config.audio.modify_pitch,
        }
    }
}

impl Default for ActionTuning {
    fn default() -> Self {
        Self::from_config(&VisConfig::default())
    }
}

/// Progress rate once the source's backlog is taken into account.
///
/// Never below `rate`, never above `max_rate`.
pub fn effective_rate(rate: f32, pending: usize, max_rate: f32) -> f32 {
    (rate * (pending as f32).max(1.0)).min(max_rate)
}

/// What happened during one `advance` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Advance {
    /// The one-time effect ran on this tick.
    pub applied: bool,
    /// The action moved from Pending to Finished on this tick.
    pub completed: bool,
}

/// A single animated event.
#[derive(Debug, Clone)]
pub struct Action {
    source: ActorId,
    target: FileId,
    timestamp: Timestamp,
    start_delay: f32,
    kind: ActionKind,
    colour: Colour,
    progress: f32,
    applied: bool,
    tuning: ActionTuning,
}

impl Action {
    /// A plain touch action with an explicit colour.
    pub fn new(
        source: ActorId,
        target: FileId,
        timestamp: Timestamp,
        start_delay: f32,
        colour: Colour,
    ) -> Self {
        Self::with_kind(source, target, timestamp, start_delay, ActionKind::Touch, colour)
    }

    pub fn create(source: ActorId, target: FileId, timestamp: Timestamp, start_delay: f32) -> Self {
        Self::with_kind(source, target, timestamp, start_delay, ActionKind::Create, CREATE_COLOUR)
    }

    pub fn remove(source: ActorId, target: FileId, timestamp: Timestamp, start_delay: f32) -> Self {
        Self::with_kind(source, target, timestamp, start_delay, ActionKind::Remove, REMOVE_COLOUR)
    }

    pub fn modify(
        source: ActorId,
        target: FileId,
        timestamp: Timestamp,
        start_delay: f32,
        tint: Colour,
    ) -> Self {
        Self::with_kind(
            source,
            target,
            timestamp,
            start_delay,
            ActionKind::Modify { tint },
            MODIFY_COLOUR,
        )
    }

    pub fn with_kind(
        source: ActorId,
        target: FileId,
        timestamp: Timestamp,
        start_delay: f32,
        kind: ActionKind,
        colour: Colour,
    ) -> Self {
        Self {
            source,
            target,
            timestamp,
            start_delay,
            kind,
            colour,
            progress: 0.0,
            applied: false,
            tuning: ActionTuning::default(),
        }
    }

    /// Override the beam colour.
    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_tuning(mut self, tuning: ActionTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn source(&self) -> ActorId {
        self.source
    }

    pub fn target(&self) -> FileId {
        self.target
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Stored scheduling offset; `advance` does not wait on it.
    pub fn start_delay(&self) -> f32 {
        self.start_delay
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn rate(&self) -> f32 {
        self.tuning.rate
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// Rate this action would progress at given its source's backlog.
    pub fn effective_rate(&self, pending: usize) -> f32 {
        effective_rate(self.tuning.rate, pending, self.tuning.max_rate)
    }

    /// Step the animation by `dt` seconds.
    ///
    /// Negative or non-finite `dt` counts as zero. A zero-length tick
    /// leaves the action untouched, so the apply waits for the first tick
    /// that actually moves it.
    pub fn advance<S, T, C>(&mut self, dt: f32, source: &S, target: &mut T, cues: &C) -> Advance
    where
        S: ActionSource + ?Sized,
        T: ActionTarget + ?Sized,
        C: CueSink + ?Sized,
    {
        let mut outcome = Advance::default();
        if self.is_finished() {
            return outcome;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if dt == 0.0 {
            return outcome;
        }

        if !self.applied {
            self.applied = true;
            self.apply_effect(target, cues);
            outcome.applied = true;
        }

        let rate = self.effective_rate(source.pending_action_count());
        self.progress = (self.progress + rate * dt).min(1.0);

        if self.is_finished() {
            outcome.completed = true;
            self.on_complete(target);
        }

        outcome
    }

    fn apply_effect<T, C>(&self, target: &mut T, cues: &C)
    where
        T: ActionTarget + ?Sized,
        C: CueSink + ?Sized,
    {
        tracing::debug!(
            kind = self.kind.label(),
            file = %self.target,
            timestamp = self.timestamp,
            "applying action"
        );
        match self.kind {
            ActionKind::Touch => target.touch(self.timestamp, self.colour),
            ActionKind::Create => cues.trigger(self.cue(self.tuning.create_pitch)),
            ActionKind::Remove => cues.trigger(self.cue(self.tuning.remove_pitch)),
            ActionKind::Modify { tint } => {
                target.touch(self.timestamp, self.colour);
                target.set_colour(tint);
                cues.trigger(self.cue(self.tuning.modify_pitch));
            }
        }
    }

    fn on_complete<T>(&self, target: &mut T)
    where
        T: ActionTarget + ?Sized,
    {
        if let ActionKind::Remove = self.kind {
            target.remove(self.timestamp);
        }
    }

    fn cue(&self, pitch: f32) -> Cue {
        Cue::tone(pitch, self.tuning.cue_duration)
    }

    /// The beam quad for the current state, or `None` once finished.
    pub fn quad<S, T>(&self, source: &S, target: &T) -> Option<[QuadVertex; 4]>
    where
        S: ActionSource + ?Sized,
        T: ActionTarget + ?Sized,
    {
        if self.is_finished() {
            return None;
        }
        Some(beam_quad(
            source.position(),
            target.absolute_position(),
            target.size(),
            self.colour,
            self.progress,
            self.tuning.style,
        ))
    }

    /// Append the beam to a retained batch.
    pub fn emit_geometry<S, T>(&self, source: &S, target: &T, sink: &mut impl GeometrySink)
    where
        S: ActionSource + ?Sized,
        T: ActionTarget + ?Sized,
    {
        if let Some(quad) = self.quad(source, target) {
            sink.add_quad(quad);
        }
    }

    /// Draw the beam through an immediate-mode canvas.
    pub fn draw_immediate<S, T>(&self, source: &S, target: &T, canvas: &mut impl ImmediateCanvas)
    where
        S: ActionSource + ?Sized,
        T: ActionTarget + ?Sized,
    {
        if let Some(quad) = self.quad(source, target) {
            draw_quad(canvas, &quad);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Actor, FileNode};
    use crate::renderer::quads::{QuadBatch, RecordingCanvas};
    use glam::Vec2;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Cues(RefCell<Vec<Cue>>);

    impl CueSink for Cues {
        fn trigger(&self, cue: Cue) {
            self.0.borrow_mut().push(cue);
        }
    }

    fn ids() -> (ActorId, FileId) {
        (ActorId::new(0, 0), FileId::new(0, 0))
    }

    fn actor(pending: usize) -> Actor {
        let mut actor = Actor::new("alice", Vec2::ZERO);
        for _ in 0..pending {
            actor.push_pending(0);
        }
        actor
    }

    fn file() -> FileNode {
        FileNode::new("src/lib.rs", Vec2::new(10.0, 0.0), 2.0)
    }

    #[test]
    fn test_effective_rate() {
        assert_eq!(effective_rate(0.5, 0, 10.0), 0.5);
        assert_eq!(effective_rate(0.5, 1, 10.0), 0.5);
        assert_eq!(effective_rate(0.5, 4, 10.0), 2.0);
        assert_eq!(effective_rate(0.5, 50, 10.0), 10.0);
    }

    #[test]
    fn test_new_action_is_pending() {
        let (a, f) = ids();
        let action = Action::create(a, f, 100, 0.25);
        assert_eq!(action.progress(), 0.0);
        assert!(!action.is_finished());
        assert!(!action.is_applied());
        assert_eq!(action.rate(), 0.5);
        assert_eq!(action.start_delay(), 0.25);
        assert_eq!(action.colour(), CREATE_COLOUR);
    }

    #[test]
    fn test_apply_fires_once() {
        let (a, f) = ids();
        let source = actor(1);
        let mut target = file();
        let cues = Cues::default();
        let mut action = Action::new(a, f, 7, 0.0, Colour::Z);

        let first = action.advance(0.1, &source, &mut target, &cues);
        let second = action.advance(0.1, &source, &mut target, &cues);

        assert!(first.applied);
        assert!(!second.applied);
        assert_eq!(target.touch_count, 1);
        assert_eq!(target.last_touched, Some(7));
        assert_eq!(target.touch_colour, Some(Colour::Z));
        assert!(cues.0.borrow().is_empty());
    }

    #[test]
    fn test_zero_and_negative_dt_do_nothing() {
        let (a, f) = ids();
        let source = actor(1);
        let mut target = file();
        let cues = Cues::default();
        let mut action = Action::new(a, f, 0, 0.0, Colour::ONE);

        assert_eq!(action.advance(0.0, &source, &mut target, &cues), Advance::default());
        assert_eq!(action.advance(-1.0, &source, &mut target, &cues), Advance::default());
        assert_eq!(action.advance(f32::NAN, &source, &mut target, &cues), Advance::default());
        assert_eq!(action.progress(), 0.0);
        assert!(!action.is_applied());
        assert_eq!(target.touch_count, 0);
    }

    #[test]
    fn test_progress_clamps_and_finishes() {
        let (a, f) = ids();
        let source = actor(1);
        let mut target = file();
        let cues = Cues::default();
        let mut action = Action::new(a, f, 0, 0.0, Colour::ONE);

        action.advance(1.0, &source, &mut target, &cues);
        assert!((action.progress() - 0.5).abs() < 1e-6);

        let outcome = action.advance(5.0, &source, &mut target, &cues);
        assert!(outcome.completed);
        assert_eq!(action.progress(), 1.0);
        assert!(action.is_finished());

        let after = action.advance(1.0, &source, &mut target, &cues);
        assert_eq!(after, Advance::default());
    }

    #[test]
    fn test_backlog_speeds_up_progress() {
        let (a, f) = ids();
        let source = actor(4);
        let mut target = file();
        let cues = Cues::default();
        let mut action = Action::new(a, f, 0, 0.0, Colour::ONE);

        action.advance(0.25, &source, &mut target, &cues);
        assert!((action.progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_create_plays_cue_without_touching() {
        let (a, f) = ids();
        let mut target = file();
        let cues = Cues::default();
        let mut action = Action::create(a, f, 3, 0.0);

        action.advance(0.1, &actor(1), &mut target, &cues);

        assert_eq!(target.touch_count, 0);
        assert_eq!(cues.0.borrow().as_slice(), &[Cue::tone(440.0, 0.1)]);
    }

    #[test]
    fn test_remove_removes_once_on_completion() {
        let (a, f) = ids();
        let source = actor(1);
        let mut target = file();
        let cues = Cues::default();
        let mut action = Action::remove(a, f, 42, 0.0);

        action.advance(1.0, &source, &mut target, &cues);
        assert!(!target.is_removed());
        assert_eq!(target.touch_count, 0);
        assert_eq!(cues.0.borrow().as_slice(), &[Cue::tone(110.0, 0.1)]);

        let outcome = action.advance(1.0, &source, &mut target, &cues);
        assert!(outcome.completed);
        assert_eq!(target.removed_at, Some(42));

        target.removed_at = None;
        action.advance(1.0, &source, &mut target, &cues);
        assert!(!target.is_removed());
    }

    #[test]
    fn test_modify_touches_recolours_and_plays() {
        let (a, f) = ids();
        let mut target = file();
        let cues = Cues::default();
        let tint = Colour::new(0.2, 0.4, 0.6);
        let mut action = Action::modify(a, f, 9, 0.0, tint);

        action.advance(0.1, &actor(1), &mut target, &cues);

        assert_eq!(target.touch_count, 1);
        assert_eq!(target.colour, tint);
        // the recolour lands after the touch, so the tint is what shows
        assert_eq!(target.display_colour(), tint);
        assert_eq!(cues.0.borrow().as_slice(), &[Cue::tone(220.0, 0.1)]);
    }

    #[test]
    fn test_geometry_matches_reference_beam() {
        let (a, f) = ids();
        let source = actor(1);
        let mut target = file();
        let cues = Cues::default();
        let mut action = Action::new(a, f, 0, 0.0, Colour::ONE);
        action.advance(1.0, &source, &mut target, &cues);

        let mut batch = QuadBatch::new();
        action.emit_geometry(&source, &target, &mut batch);
        let quad = batch.quad(0).unwrap();

        assert!((quad[2].position() - Vec2::new(10.0, 1.0)).length() < 1e-5);
        assert!((quad[3].position() - Vec2::new(10.0, -1.0)).length() < 1e-5);
        assert!((quad[0].position() - Vec2::new(0.0, -0.3)).length() < 1e-5);
        assert!((quad[1].position() - Vec2::new(0.0, 0.3)).length() < 1e-5);
        assert!((quad[2].alpha() - 0.5).abs() < 1e-6);
        assert!((quad[0].alpha() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_immediate_and_batched_paths_agree() {
        let (a, f) = ids();
        let source = Actor::new("bob", Vec2::new(-4.0, 2.0));
        let target = FileNode::new("x", Vec2::new(6.0, -7.0), 3.0);
        let action = Action::modify(a, f, 0, 0.0, Colour::ONE);

        let mut batch = QuadBatch::new();
        action.emit_geometry(&source, &target, &mut batch);
        let mut canvas = RecordingCanvas::new();
        action.draw_immediate(&source, &target, &mut canvas);

        assert_eq!(canvas.quads().len(), 1);
        assert_eq!(&canvas.quads()[0][..], batch.quad(0).unwrap());
    }

    #[test]
    fn test_finished_action_draws_nothing() {
        let (a, f) = ids();
        let source = actor(1);
        let mut target = file();
        let mut action = Action::new(a, f, 0, 0.0, Colour::ONE);
        action.advance(10.0, &source, &mut target, &Cues::default());

        let mut batch = QuadBatch::new();
        action.emit_geometry(&source, &target, &mut batch);
        let mut canvas = RecordingCanvas::new();
        action.draw_immediate(&source, &target, &mut canvas);

        assert!(batch.is_empty());
        assert!(canvas.quads().is_empty());
    }
}
