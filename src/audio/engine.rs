//! Long-lived audio engine.
//!
//! The engine owns a worker thread and a backend for the whole session.
//! Callers hold cheap `CueTrigger` clones and enqueue cues without ever
//! waiting: a full queue or a stopped engine drops the cue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc::{self, error::TrySendError};

use super::backend::{AudioBackend, AudioFormat};
use super::cue::Cue;
use super::synth::ToneSynth;
use super::CueSink;
use crate::core::config::AudioConfig;
use crate::core::error::{Result, VisError};

#[derive(Debug)]
enum EngineCommand {
    Play(Cue),
    Shutdown,
}

/// Counters reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub played: usize,
    pub failed: usize,
    /// Cues received while the backend was unusable.
    pub discarded: usize,
}

/// Cloneable, thread-safe handle for enqueueing cues.
#[derive(Debug, Clone, Default)]
pub struct CueTrigger {
    tx: Option<mpsc::Sender<EngineCommand>>,
    dropped: Arc<AtomicUsize>,
}

impl CueTrigger {
    /// A trigger that silently ignores every cue.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Cues that never reached the worker.
    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl CueSink for CueTrigger {
    fn trigger(&self, cue: Cue) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(EngineCommand::Play(cue)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%cue, "audio queue full, cue dropped");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%cue, "audio engine stopped, cue dropped");
            }
        }
    }
}

/// Owns the audio worker thread.
pub struct AudioEngine {
    trigger: CueTrigger,
    worker: Option<JoinHandle<EngineStats>>,
}

impl AudioEngine {
    /// Spawn the worker and hand it the backend.
    ///
    /// A backend that fails to open does not fail this call; the worker
    /// logs the failure and discards cues instead.
    pub fn start(config: &AudioConfig, backend: Box<dyn AudioBackend>) -> Result<Self> {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let format = AudioFormat {
            sample_rate: config.sample_rate,
            channels: config.channels,
        };
        let synth = ToneSynth::new(config.sample_rate, config.channels, config.amplitude);
        let backend_name = backend.name();

        let worker = std::thread::Builder::new()
            .name("audio-cues".into())
            .spawn(move || run_worker(rx, backend, synth, format))
            .map_err(|e| VisError::Audio(format!("failed to spawn audio worker: {}", e)))?;

        tracing::info!(
            backend = backend_name,
            sample_rate = format.sample_rate,
            channels = format.channels,
            queue = config.queue_capacity,
            "audio engine started"
        );

        Ok(Self {
            trigger: CueTrigger {
                tx: Some(tx),
                dropped: Arc::new(AtomicUsize::new(0)),
            },
            worker: Some(worker),
        })
    }

    /// Start an engine, or fall back to a disabled trigger if that fails.
    pub fn start_or_disabled(
        config: &AudioConfig,
        backend: Box<dyn AudioBackend>,
    ) -> (Option<Self>, CueTrigger) {
        if !config.enabled {
            tracing::info!("audio disabled by config");
            return (None, CueTrigger::disabled());
        }
        match Self::start(config, backend) {
            Ok(engine) => {
                let trigger = engine.trigger();
                (Some(engine), trigger)
            }
            Err(e) => {
                tracing::warn!(error = %e, "audio unavailable, continuing without cues");
                (None, CueTrigger::disabled())
            }
        }
    }

    pub fn trigger(&self) -> CueTrigger {
        self.trigger.clone()
    }

    /// Finish the queued cues, close the backend and join the worker.
    ///
    /// Blocks; do not call from inside an async runtime.
    pub fn shutdown(mut self) -> EngineStats {
        self.stop()
    }

    fn stop(&mut self) -> EngineStats {
        let Some(worker) = self.worker.take() else {
            return EngineStats::default();
        };
        if let Some(tx) = &self.trigger.tx {
            // Queue behind pending cues so they still play.
            if tx.blocking_send(EngineCommand::Shutdown).is_err() {
                tracing::debug!("audio worker already gone");
            }
        }
        match worker.join() {
            Ok(stats) => stats,
            Err(_) => {
                tracing::error!("audio worker panicked");
                EngineStats::default()
            }
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    mut rx: mpsc::Receiver<EngineCommand>,
    mut backend: Box<dyn AudioBackend>,
    synth: ToneSynth,
    format: AudioFormat,
) -> EngineStats {
    let mut stats = EngineStats::default();
    let usable = match backend.open(format) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                backend = backend.name(),
                error = %e,
                "audio backend failed to open, cues will be discarded"
            );
            false
        }
    };

    while let Some(command) = rx.blocking_recv() {
        let cue = match command {
            EngineCommand::Play(cue) => cue,
            EngineCommand::Shutdown => break,
        };
        if !usable {
            stats.discarded += 1;
            continue;
        }
        match synth.render(&cue).and_then(|samples| backend.play(&samples)) {
            Ok(()) => stats.played += 1,
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(%cue, error = %e, "cue failed");
            }
        }
    }

    if usable {
        if let Err(e) = backend.close() {
            tracing::warn!(backend = backend.name(), error = %e, "audio backend failed to close");
        }
    }
    tracing::info!(
        played = stats.played,
        failed = stats.failed,
        discarded = stats.discarded,
        "audio engine stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::{CaptureBackend, NullBackend};

    struct BrokenBackend;

    impl AudioBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn open(&mut self, _format: AudioFormat) -> Result<()> {
            Err(VisError::Audio("no device".into()))
        }

        fn play(&mut self, _samples: &[f32]) -> Result<()> {
            unreachable!("never opened")
        }
    }

    #[test]
    fn test_engine_plays_queued_cues_before_shutdown() {
        let capture = CaptureBackend::new();
        let engine = AudioEngine::start(&AudioConfig::default(), Box::new(capture.clone())).unwrap();
        let trigger = engine.trigger();

        trigger.trigger(Cue::tone(440.0, 0.1));
        trigger.trigger(Cue::tone(110.0, 0.1));
        let stats = engine.shutdown();

        assert_eq!(stats.played, 2);
        assert_eq!(capture.cue_count(), 2);
        assert_eq!(capture.sample_count(), 2 * 4410 * 2);
    }

    #[test]
    fn test_null_backend_still_counts_played() {
        let engine = AudioEngine::start(&AudioConfig::default(), Box::new(NullBackend)).unwrap();
        let trigger = engine.trigger();
        for _ in 0..3 {
            trigger.trigger(Cue::tone(220.0, 0.1));
        }
        let stats = engine.shutdown();
        assert_eq!(stats.played, 3);
        assert_eq!(stats.discarded, 0);
    }

    #[test]
    fn test_trigger_after_shutdown_is_dropped() {
        let engine = AudioEngine::start(&AudioConfig::default(), Box::new(CaptureBackend::new())).unwrap();
        let trigger = engine.trigger();
        engine.shutdown();

        assert!(!trigger.is_enabled());
        trigger.trigger(Cue::tone(440.0, 0.1));
        assert_eq!(trigger.dropped_count(), 1);
    }

    #[test]
    fn test_broken_backend_discards_cues() {
        let engine = AudioEngine::start(&AudioConfig::default(), Box::new(BrokenBackend)).unwrap();
        engine.trigger().trigger(Cue::tone(440.0, 0.1));
        let stats = engine.shutdown();
        assert_eq!(stats.played, 0);
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_failed_render_is_counted() {
        let engine = AudioEngine::start(&AudioConfig::default(), Box::new(CaptureBackend::new())).unwrap();
        engine.trigger().trigger(Cue {
            instrument: 42,
            ..Cue::tone(440.0, 0.1)
        });
        let stats = engine.shutdown();
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_disabled_config_yields_disabled_trigger() {
        let config = AudioConfig {
            enabled: false,
            ..AudioConfig::default()
        };
        let (engine, trigger) = AudioEngine::start_or_disabled(&config, Box::new(CaptureBackend::new()));
        assert!(engine.is_none());
        assert!(!trigger.is_enabled());
        trigger.trigger(Cue::tone(440.0, 0.1));
        assert_eq!(trigger.dropped_count(), 0);
    }
}
