//! Audio cues for action events.
//!
//! Actions only ever see `CueSink`. The engine behind it runs on its own
//! thread, so a slow or missing audio device can never stall a tick.

pub mod backend;
pub mod cue;
#[cfg(feature = "device-audio")]
pub mod device;
pub mod engine;
pub mod synth;

pub use backend::{AudioBackend, AudioFormat, CaptureBackend, NullBackend, RawFileBackend};
pub use cue::Cue;
#[cfg(feature = "device-audio")]
pub use device::DeviceBackend;
pub use engine::{AudioEngine, CueTrigger, EngineStats};
pub use synth::ToneSynth;

/// Fire-and-forget cue destination.
pub trait CueSink {
    fn trigger(&self, cue: Cue);
}
