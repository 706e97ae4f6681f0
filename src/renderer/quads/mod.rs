//! Quad rendering primitives.

pub mod batch;
pub mod immediate;
pub mod vertex;

pub use batch::{GeometrySink, QuadBatch};
pub use immediate::{draw_quad, ImmediateCanvas, RecordingCanvas};
pub use vertex::{square_quad, QuadVertex};
