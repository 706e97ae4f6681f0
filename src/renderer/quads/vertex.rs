//! Vertex data for quads.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use serde::Serialize;

/// Quad vertex: 2D position, RGBA colour, texture coordinate. 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub colour: [f32; 4],
    pub tex_coord: [f32; 2],
}

impl QuadVertex {
    pub fn new(position: Vec2, colour: Vec4, tex_coord: Vec2) -> Self {
        Self {
            position: position.to_array(),
            colour: colour.to_array(),
            tex_coord: tex_coord.to_array(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn alpha(&self) -> f32 {
        self.colour[3]
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.colour.iter())
            .chain(self.tex_coord.iter())
            .all(|v| v.is_finite())
    }

    /// Vertex buffer layout descriptor.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // colour
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // tex_coord
                wgpu::VertexAttribute {
                    offset: 24,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Indices for one quad starting at `base` (two triangles).
pub fn quad_indices(base: u32) -> [u32; 6] {
    [base, base + 1, base + 2, base, base + 2, base + 3]
}

/// Axis-aligned square quad centred on `centre`, full texture square.
pub fn square_quad(centre: Vec2, size: f32, colour: Vec4) -> [QuadVertex; 4] {
    let h = size * 0.5;
    [
        QuadVertex::new(centre + Vec2::new(-h, -h), colour, Vec2::new(0.0, 0.0)),
        QuadVertex::new(centre + Vec2::new(-h, h), colour, Vec2::new(0.0, 1.0)),
        QuadVertex::new(centre + Vec2::new(h, h), colour, Vec2::new(1.0, 1.0)),
        QuadVertex::new(centre + Vec2::new(h, -h), colour, Vec2::new(1.0, 0.0)),
    ]
}
