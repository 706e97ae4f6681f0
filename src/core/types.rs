//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Logical event time (seconds since the epoch of the source log).
pub type Timestamp = i64;

/// RGB tint, each channel in 0.0-1.0.
pub type Colour = glam::Vec3;

/// Handle to an actor slot in the registry.
///
/// The generation is bumped every time a slot is reused, so a handle
/// kept past its actor's removal never resolves to a newer actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    pub index: u32,
    pub generation: u32,
}

impl ActorId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}v{}", self.index, self.generation)
    }
}

/// Handle to a file slot in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId {
    pub index: u32,
    pub generation: u32,
}

impl FileId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file#{}v{}", self.index, self.generation)
    }
}

/// Parse a `RRGGBB` hex string into a colour.
pub fn colour_from_hex(hex: &str) -> Option<Colour> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    Some(Colour::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality() {
        assert_eq!(FileId::new(1, 0), FileId::new(1, 0));
        assert_ne!(FileId::new(1, 0), FileId::new(1, 1));
        assert_ne!(ActorId::new(0, 0), ActorId::new(2, 0));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(FileId::new(3, 2).to_string(), "file#3v2");
        assert_eq!(ActorId::new(0, 1).to_string(), "actor#0v1");
    }

    #[test]
    fn test_colour_from_hex() {
        let c = colour_from_hex("FF8000").unwrap();
        assert_eq!(c.x, 1.0);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);

        assert!(colour_from_hex("#00ff00").is_some());
        assert!(colour_from_hex("GG0000").is_none());
        assert!(colour_from_hex("FFF").is_none());
    }
}
