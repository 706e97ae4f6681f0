//! Speaker output through the default audio device.
//!
//! The device stream must stay on the thread that opened it, so `open`
//! parks it on a small keeper thread and the backend only holds a `Sink`.

use std::thread::JoinHandle;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tokio::sync::oneshot;

use super::backend::{AudioBackend, AudioFormat};
use crate::core::error::{Result, VisError};

#[derive(Default)]
pub struct DeviceBackend {
    format: Option<AudioFormat>,
    sink: Option<Sink>,
    handle: Option<OutputStreamHandle>,
    stop: Option<oneshot::Sender<()>>,
    keeper: Option<JoinHandle<()>>,
}

impl DeviceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn release_stream(&mut self) {
        self.handle = None;
        // Dropping the sender wakes the keeper, which drops the stream.
        self.stop = None;
        if let Some(keeper) = self.keeper.take() {
            if keeper.join().is_err() {
                tracing::warn!("audio device thread panicked");
            }
        }
    }
}

impl AudioBackend for DeviceBackend {
    fn name(&self) -> &'static str {
        "device"
    }

    fn open(&mut self, format: AudioFormat) -> Result<()> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let keeper = std::thread::Builder::new()
            .name("actionviz-audio-device".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    let _ = stop_rx.blocking_recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| VisError::Audio(format!("failed to spawn device thread: {}", e)))?;
        self.keeper = Some(keeper);
        self.stop = Some(stop_tx);

        let handle = match ready_rx.blocking_recv() {
            Ok(Ok(handle)) => handle,
            Ok(Err(message)) => {
                self.release_stream();
                return Err(VisError::Audio(format!("no output device: {}", message)));
            }
            Err(_) => {
                self.release_stream();
                return Err(VisError::Audio("device thread exited early".into()));
            }
        };
        let sink = match Sink::try_new(&handle) {
            Ok(sink) => sink,
            Err(e) => {
                self.release_stream();
                return Err(VisError::Audio(format!("failed to open sink: {}", e)));
            }
        };

        tracing::info!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            "playing cues on the default output device"
        );
        self.format = Some(format);
        self.handle = Some(handle);
        self.sink = Some(sink);
        Ok(())
    }

    fn play(&mut self, samples: &[f32]) -> Result<()> {
        let (Some(sink), Some(format)) = (&self.sink, self.format) else {
            return Err(VisError::Audio("device backend not open".into()));
        };
        sink.append(SamplesBuffer::new(
            format.channels,
            format.sample_rate,
            samples.to_vec(),
        ));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.sleep_until_end();
        }
        self.release_stream();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_before_open_is_an_error() {
        let mut backend = DeviceBackend::new();
        assert_eq!(backend.name(), "device");
        assert!(matches!(backend.play(&[0.0; 4]), Err(VisError::Audio(_))));
        assert!(backend.close().is_ok());
    }
}
