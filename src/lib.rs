//! actionviz - animated actor-to-file action beams with audio cues

pub mod action;
pub mod audio;
pub mod core;
pub mod entity;
pub mod renderer;
pub mod scene;
