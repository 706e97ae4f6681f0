//! GPU abstractions for wgpu.

pub mod buffers;
pub mod context;
pub mod pipeline;

pub use buffers::QuadBuffers;
pub use context::GpuContext;
pub use pipeline::{BeamBlend, CameraUniform, QuadPipeline};
