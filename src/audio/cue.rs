//! Cue scripts: one instrument event per line, `i<instr> <start> <dur> <pitch>`.

use std::fmt;
use std::str::FromStr;

use nom::{
    character::complete::{char, space0, space1, u32 as instrument_number},
    combinator::all_consuming,
    number::complete::float,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VisError};

/// The only instrument the synth knows: a band-limited sawtooth.
pub const SAW_INSTRUMENT: u32 = 1;

/// A single tone event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub instrument: u32,
    /// Offset from the moment the cue is played, in seconds.
    pub start: f32,
    /// Length in seconds.
    pub duration: f32,
    /// Oscillator frequency in Hz.
    pub pitch: f32,
}

impl Cue {
    /// A saw tone starting immediately.
    pub fn tone(pitch: f32, duration: f32) -> Self {
        Self {
            instrument: SAW_INSTRUMENT,
            start: 0.0,
            duration,
            pitch,
        }
    }

    /// Parse a multi-line score. Blank lines and `;` comments are skipped.
    pub fn parse_score(score: &str) -> Result<Vec<Cue>> {
        score
            .lines()
            .map(|line| line.split(';').next().unwrap_or_default().trim())
            .filter(|line| !line.is_empty())
            .map(str::parse::<Cue>)
            .collect()
    }

    fn validate(self, input: &str) -> Result<Self> {
        let fail = |message: &str| VisError::CueParse {
            input: input.to_string(),
            message: message.to_string(),
        };
        if !(self.start >= 0.0) {
            return Err(fail("start must be >= 0"));
        }
        if !(self.duration > 0.0) {
            return Err(fail("duration must be positive"));
        }
        if !(self.pitch > 0.0) || !self.pitch.is_finite() {
            return Err(fail("pitch must be a positive frequency"));
        }
        Ok(self)
    }
}

fn cue_line(input: &str) -> IResult<&str, Cue> {
    let (rest, (_, _, instrument, _, start, _, duration, _, pitch, _)) = (
        space0,
        char('i'),
        instrument_number,
        space1,
        float,
        space1,
        float,
        space1,
        float,
        space0,
    )
        .parse(input)?;

    Ok((
        rest,
        Cue {
            instrument,
            start,
            duration,
            pitch,
        },
    ))
}

impl FromStr for Cue {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self> {
        let (_, cue) = all_consuming(cue_line)
            .parse(s)
            .map_err(|e| VisError::CueParse {
                input: s.to_string(),
                message: e.to_string(),
            })?;
        cue.validate(s)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "i{} {} {} {}",
            self.instrument, self.start, self.duration, self.pitch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_display() {
        assert_eq!(Cue::tone(440.0, 0.1).to_string(), "i1 0 0.1 440");
        assert_eq!(Cue::tone(110.0, 0.1).to_string(), "i1 0 0.1 110");
    }

    #[test]
    fn test_parse_line() {
        let cue: Cue = "i1 0 0.1 220".parse().unwrap();
        assert_eq!(cue, Cue::tone(220.0, 0.1));

        let padded: Cue = "  i2 0.5 1.25 55.5 ".parse().unwrap();
        assert_eq!(padded.instrument, 2);
        assert_eq!(padded.start, 0.5);
        assert_eq!(padded.duration, 1.25);
        assert_eq!(padded.pitch, 55.5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("x1 0 0.1 440".parse::<Cue>().is_err());
        assert!("i1 0 0.1".parse::<Cue>().is_err());
        assert!("i1 0 0.1 440 extra".parse::<Cue>().is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let err = "i1 0 0 440".parse::<Cue>().unwrap_err();
        assert!(matches!(err, VisError::CueParse { .. }));
        assert!("i1 -1 0.1 440".parse::<Cue>().is_err());
        assert!("i1 0 0.1 0".parse::<Cue>().is_err());
    }

    #[test]
    fn test_parse_score() {
        let cues = Cue::parse_score(
            "; startup chime\n\
             i1 0 0.1 440\n\
             \n\
             i1 0.1 0.1 220 ; lower\n",
        )
        .unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].start, 0.1);
    }
}
