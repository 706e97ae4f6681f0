//! Growable vertex and index buffers for the frame's quad batch.

use super::context::GpuContext;
use crate::renderer::quads::{QuadBatch, QuadVertex};

const MIN_QUADS: usize = 1024;

/// Dynamic buffers, rewritten every frame with one upload each.
pub struct QuadBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    /// Quads the current buffers can hold.
    pub capacity: usize,
    /// Indices written by the last upload.
    pub index_count: u32,
}

impl QuadBuffers {
    /// Create buffers sized for `initial_quads` quads.
    pub fn new(ctx: &GpuContext, initial_quads: usize) -> Self {
        let capacity = initial_quads.max(1);
        Self {
            vertex_buffer: Self::create_vertex_buffer(ctx, capacity),
            index_buffer: Self::create_index_buffer(ctx, capacity),
            capacity,
            index_count: 0,
        }
    }

    fn create_vertex_buffer(ctx: &GpuContext, quads: usize) -> wgpu::Buffer {
        ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Vertex Buffer"),
            size: (quads * 4 * std::mem::size_of::<QuadVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_index_buffer(ctx: &GpuContext, quads: usize) -> wgpu::Buffer {
        ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Index Buffer"),
            size: (quads * 6 * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Ensure room for `needed` quads. Returns true if the buffers were reallocated.
    pub fn ensure_capacity(&mut self, ctx: &GpuContext, needed: usize) -> bool {
        if needed <= self.capacity {
            return false;
        }

        let new_capacity = (needed * 2).max(MIN_QUADS);
        self.vertex_buffer = Self::create_vertex_buffer(ctx, new_capacity);
        self.index_buffer = Self::create_index_buffer(ctx, new_capacity);
        self.capacity = new_capacity;
        tracing::debug!("Grew quad buffers to {} quads", new_capacity);
        true
    }

    /// Upload the whole batch. Returns the number of indices to draw.
    pub fn upload(&mut self, ctx: &GpuContext, batch: &QuadBatch) -> u32 {
        self.ensure_capacity(ctx, batch.quad_count());

        if !batch.is_empty() {
            ctx.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(batch.vertices()));
            ctx.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(batch.indices()));
        }
        self.index_count = batch.indices().len() as u32;
        self.index_count
    }
}
