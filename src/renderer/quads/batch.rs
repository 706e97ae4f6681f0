//! Retained quad batch, filled once per frame and uploaded in one go.

use serde::Serialize;

use super::vertex::{quad_indices, QuadVertex};

/// Anything that accepts quads for deferred submission.
pub trait GeometrySink {
    fn add_quad(&mut self, quad: [QuadVertex; 4]);
}

/// CPU-side vertex and index lists for a frame's quads.
#[derive(Clone, Debug, Default, Serialize)]
pub struct QuadBatch {
    vertices: Vec<QuadVertex>,
    indices: Vec<u32>,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    /// Drop all quads but keep the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[QuadVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The four vertices of quad `n`.
    pub fn quad(&self, n: usize) -> Option<&[QuadVertex]> {
        self.vertices.get(n * 4..n * 4 + 4)
    }
}

impl GeometrySink for QuadBatch {
    fn add_quad(&mut self, quad: [QuadVertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&quad);
        self.indices.extend_from_slice(&quad_indices(base));
    }
}
