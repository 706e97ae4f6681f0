//! Audio output backends.
//!
//! A backend is handed rendered, interleaved f32 samples by the engine
//! worker. It lives on that worker thread for the whole engine lifetime.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::core::error::{Result, VisError};

/// Sample format shared by the engine and its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

pub trait AudioBackend: Send {
    fn name(&self) -> &'static str;

    /// Called once on the worker thread before the first cue.
    fn open(&mut self, _format: AudioFormat) -> Result<()> {
        Ok(())
    }

    /// Output one rendered cue.
    fn play(&mut self, samples: &[f32]) -> Result<()>;

    /// Called once when the engine shuts down.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn play(&mut self, samples: &[f32]) -> Result<()> {
        tracing::trace!(samples = samples.len(), "null backend discarding cue");
        Ok(())
    }
}

/// Keeps every sample in memory. Clone the handle before moving the
/// backend into the engine to inspect what was played.
#[derive(Debug, Default, Clone)]
pub struct CaptureBackend {
    samples: Arc<Mutex<Vec<f32>>>,
    cues: Arc<Mutex<usize>>,
}

impl CaptureBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn cue_count(&self) -> usize {
        self.cues.lock().map(|c| *c).unwrap_or(0)
    }

    pub fn samples(&self) -> Vec<f32> {
        self.samples.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl AudioBackend for CaptureBackend {
    fn name(&self) -> &'static str {
        "capture"
    }

    fn play(&mut self, samples: &[f32]) -> Result<()> {
        self.samples
            .lock()
            .map_err(|_| VisError::Audio("capture buffer poisoned".into()))?
            .extend_from_slice(samples);
        *self
            .cues
            .lock()
            .map_err(|_| VisError::Audio("capture counter poisoned".into()))? += 1;
        Ok(())
    }
}

/// Appends raw native-endian f32 PCM to a file, one cue after another.
#[derive(Debug)]
pub struct RawFileBackend {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl RawFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }
}

impl AudioBackend for RawFileBackend {
    fn name(&self) -> &'static str {
        "raw-file"
    }

    fn open(&mut self, format: AudioFormat) -> Result<()> {
        let file = File::create(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            "writing cues as raw f32 PCM"
        );
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn play(&mut self, samples: &[f32]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| VisError::Audio("raw file backend not open".into()))?;
        writer.write_all(bytemuck::cast_slice(samples))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
