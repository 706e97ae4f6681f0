//! File nodes: the targets actions point at.

use glam::Vec2;

use super::ActionTarget;
use crate::core::types::{Colour, Timestamp};

/// A file in the scene.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub path: String,
    /// World position, as placed by the layout.
    pub position: Vec2,
    pub size: f32,
    /// The file's own colour.
    pub colour: Colour,
    /// Tint of the last touch, cleared by a later `set_colour`.
    pub touch_colour: Option<Colour>,
    /// Newest timestamp any touch has carried.
    pub last_touched: Option<Timestamp>,
    pub touch_count: u32,
    /// Set once a remove action completes against this file.
    pub removed_at: Option<Timestamp>,
}

impl FileNode {
    pub fn new(path: impl Into<String>, position: Vec2, size: f32) -> Self {
        Self {
            path: path.into(),
            position,
            size,
            colour: Colour::ONE,
            touch_colour: None,
            last_touched: None,
            touch_count: 0,
            removed_at: None,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed_at.is_some()
    }

    /// Colour to draw the node with: whichever of touch tint and file colour was written last.
    pub fn display_colour(&self) -> Colour {
        self.touch_colour.unwrap_or(self.colour)
    }
}

impl ActionTarget for FileNode {
    fn absolute_position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> f32 {
        self.size
    }

    fn touch(&mut self, timestamp: Timestamp, colour: Colour) {
        self.touch_count += 1;
        self.touch_colour = Some(colour);
        self.last_touched = Some(self.last_touched.map_or(timestamp, |t| t.max(timestamp)));
        // A touch after a removal brings the file back.
        if self.removed_at.is_some_and(|removed| timestamp > removed) {
            self.removed_at = None;
        }
    }

    fn remove(&mut self, timestamp: Timestamp) {
        if self.last_touched.is_some_and(|touched| touched > timestamp) {
            tracing::debug!(path = %self.path, timestamp, "ignoring remove older than last touch");
            return;
        }
        self.removed_at = Some(timestamp);
    }

    fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
        self.touch_colour = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_keeps_latest_timestamp() {
        let mut file = FileNode::new("src/main.rs", Vec2::ZERO, 2.0);
        file.touch(20, Colour::X);
        file.touch(10, Colour::Y);

        assert_eq!(file.last_touched, Some(20));
        assert_eq!(file.touch_count, 2);
        // Colour is last-write-wins regardless of timestamp
        assert_eq!(file.touch_colour, Some(Colour::Y));
    }

    #[test]
    fn test_remove_and_revive() {
        let mut file = FileNode::new("a.txt", Vec2::ZERO, 2.0);
        file.remove(5);
        assert!(file.is_removed());

        file.touch(6, Colour::ONE);
        assert!(!file.is_removed());
    }

    #[test]
    fn test_stale_remove_is_ignored() {
        let mut file = FileNode::new("a.txt", Vec2::ZERO, 2.0);
        file.touch(10, Colour::ONE);
        file.remove(3);
        assert!(!file.is_removed());
    }

    #[test]
    fn test_display_colour() {
        let mut file = FileNode::new("a.txt", Vec2::ZERO, 2.0);
        file.set_colour(Colour::Z);
        assert_eq!(file.display_colour(), Colour::Z);
        file.touch(1, Colour::X);
        assert_eq!(file.display_colour(), Colour::X);
    }

    #[test]
    fn test_set_colour_after_touch_wins() {
        let mut file = FileNode::new("a.txt", Vec2::ZERO, 2.0);
        file.touch(1, Colour::X);
        file.set_colour(Colour::Y);
        assert_eq!(file.touch_colour, None);
        assert_eq!(file.display_colour(), Colour::Y);

        file.touch(2, Colour::Z);
        assert_eq!(file.display_colour(), Colour::Z);
        assert_eq!(file.colour, Colour::Y);
    }
}
