//! Tone synthesis for cues.

use super::cue::{Cue, SAW_INSTRUMENT};
use crate::core::error::{Result, VisError};

/// Ramp length at both ends of a tone, in seconds.
const DECLICK_SECS: f32 = 0.002;

/// Renders cues to interleaved f32 samples.
#[derive(Debug, Clone, Copy)]
pub struct ToneSynth {
    pub sample_rate: u32,
    pub channels: u16,
    pub amplitude: f32,
}

impl ToneSynth {
    pub fn new(sample_rate: u32, channels: u16, amplitude: f32) -> Self {
        Self {
            sample_rate,
            channels,
            amplitude,
        }
    }

    /// Frames of silence before the tone plus the tone itself.
    pub fn frame_count(&self, cue: &Cue) -> usize {
        let sr = self.sample_rate as f32;
        (cue.start * sr).round() as usize + (cue.duration * sr).round() as usize
    }

    /// Render a cue. The same mono signal is written to every channel.
    pub fn render(&self, cue: &Cue) -> Result<Vec<f32>> {
        if cue.instrument != SAW_INSTRUMENT {
            return Err(VisError::Audio(format!(
                "unknown instrument {}",
                cue.instrument
            )));
        }

        let sr = self.sample_rate as f32;
        let nyquist = sr * 0.5;
        if cue.pitch >= nyquist {
            return Err(VisError::Audio(format!(
                "pitch {} Hz is above Nyquist ({} Hz)",
                cue.pitch, nyquist
            )));
        }

        let channels = usize::from(self.channels);
        let lead = (cue.start * sr).round() as usize;
        let frames = (cue.duration * sr).round() as usize;
        let ramp = ((DECLICK_SECS * sr) as usize).clamp(1, (frames / 2).max(1));

        let mut out = vec![0.0f32; (lead + frames) * channels];
        let dt = cue.pitch / sr;
        let mut phase = 0.0f32;

        for i in 0..frames {
            let envelope = if i < ramp {
                i as f32 / ramp as f32
            } else if frames - i <= ramp {
                (frames - i) as f32 / ramp as f32
            } else {
                1.0
            };

            let sample = (2.0 * phase - 1.0 - poly_blep(phase, dt)) * self.amplitude * envelope;
            let frame = (lead + i) * channels;
            out[frame..frame + channels].fill(sample);

            phase += dt;
            if phase >= 1.0 {
                phase -= 1.0;
            }
        }

        Ok(out)
    }
}

/// Polynomial band-limited step correction for a sawtooth discontinuity.
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> ToneSynth {
        ToneSynth::new(44_100, 2, 0.5)
    }

    #[test]
    fn test_render_length() {
        let samples = synth().render(&Cue::tone(440.0, 0.1)).unwrap();
        assert_eq!(samples.len(), 4410 * 2);
        assert_eq!(synth().frame_count(&Cue::tone(440.0, 0.1)), 4410);
    }

    #[test]
    fn test_render_respects_amplitude() {
        let samples = synth().render(&Cue::tone(220.0, 0.1)).unwrap();
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.3, "peak was {}", peak);
        assert!(peak <= 0.5 + 1e-3, "peak was {}", peak);
    }

    #[test]
    fn test_channels_are_identical() {
        let samples = synth().render(&Cue::tone(110.0, 0.05)).unwrap();
        for frame in samples.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_start_offset_is_silent() {
        let cue = Cue {
            start: 0.01,
            ..Cue::tone(440.0, 0.01)
        };
        let samples = synth().render(&cue).unwrap();
        assert_eq!(samples.len(), 441 * 2 * 2);
        assert!(samples[..441 * 2].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_tone_starts_and_ends_quiet() {
        let samples = synth().render(&Cue::tone(440.0, 0.1)).unwrap();
        assert_eq!(samples[0], 0.0);
        assert!(samples[samples.len() - 1].abs() < 0.05);
    }

    #[test]
    fn test_rejects_unknown_instrument() {
        let cue = Cue {
            instrument: 9,
            ..Cue::tone(440.0, 0.1)
        };
        assert!(synth().render(&cue).is_err());
    }

    #[test]
    fn test_rejects_pitch_above_nyquist() {
        assert!(synth().render(&Cue::tone(30_000.0, 0.1)).is_err());
    }
}
