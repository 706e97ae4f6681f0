//! Immediate-mode drawing for backends without a retained vertex buffer.
//!
//! The canvas is driven the old fixed-function way: open a quad, set the
//! current colour and texture coordinate, emit a vertex, repeat, close.

use glam::{Vec2, Vec4};

use super::batch::GeometrySink;
use super::vertex::QuadVertex;

pub trait ImmediateCanvas {
    fn begin_quads(&mut self);
    fn colour(&mut self, rgba: Vec4);
    fn tex_coord(&mut self, uv: Vec2);
    fn vertex(&mut self, position: Vec2);
    fn end(&mut self);
}

/// Walk a quad through an immediate canvas.
///
/// Colour is only re-issued when it changes, matching how a beam sets one
/// colour for its tail pair and another for its head pair.
pub fn draw_quad(canvas: &mut (impl ImmediateCanvas + ?Sized), quad: &[QuadVertex; 4]) {
    canvas.begin_quads();
    let mut current: Option<[f32; 4]> = None;
    for v in quad {
        if current != Some(v.colour) {
            canvas.colour(Vec4::from_array(v.colour));
            current = Some(v.colour);
        }
        canvas.tex_coord(Vec2::from_array(v.tex_coord));
        canvas.vertex(Vec2::from_array(v.position));
    }
    canvas.end();
}

/// Canvas that records the quads drawn on it.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    colour: Vec4,
    tex_coord: Vec2,
    open: Vec<QuadVertex>,
    in_quads: bool,
    quads: Vec<[QuadVertex; 4]>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            colour: Vec4::ONE,
            ..Default::default()
        }
    }

    pub fn quads(&self) -> &[[QuadVertex; 4]] {
        &self.quads
    }

    /// Hand every recorded quad to a retained sink.
    pub fn flush_into(&mut self, sink: &mut impl GeometrySink) {
        for quad in self.quads.drain(..) {
            sink.add_quad(quad);
        }
    }
}

impl ImmediateCanvas for RecordingCanvas {
    fn begin_quads(&mut self) {
        self.in_quads = true;
        self.open.clear();
    }

    fn colour(&mut self, rgba: Vec4) {
        self.colour = rgba;
    }

    fn tex_coord(&mut self, uv: Vec2) {
        self.tex_coord = uv;
    }

    fn vertex(&mut self, position: Vec2) {
        if !self.in_quads {
            tracing::warn!("vertex outside begin_quads/end ignored");
            return;
        }
        self.open
            .push(QuadVertex::new(position, self.colour, self.tex_coord));
        if self.open.len() == 4 {
            self.quads
                .push([self.open[0], self.open[1], self.open[2], self.open[3]]);
            self.open.clear();
        }
    }

    fn end(&mut self) {
        if !self.open.is_empty() {
            tracing::warn!(dangling = self.open.len(), "incomplete quad dropped");
            self.open.clear();
        }
        self.in_quads = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::quads::batch::QuadBatch;
    use crate::renderer::quads::vertex::square_quad;

    #[test]
    fn test_draw_quad_records_same_vertices() {
        let quad = square_quad(Vec2::new(2.0, 3.0), 2.0, Vec4::new(1.0, 0.0, 0.0, 0.5));
        let mut canvas = RecordingCanvas::new();
        draw_quad(&mut canvas, &quad);

        assert_eq!(canvas.quads().len(), 1);
        assert_eq!(canvas.quads()[0], quad);
    }

    #[test]
    fn test_incomplete_quad_is_dropped() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_quads();
        canvas.vertex(Vec2::ZERO);
        canvas.vertex(Vec2::ONE);
        canvas.end();
        assert!(canvas.quads().is_empty());
    }

    #[test]
    fn test_flush_into_batch() {
        let mut canvas = RecordingCanvas::new();
        draw_quad(&mut canvas, &square_quad(Vec2::ZERO, 1.0, Vec4::ONE));
        let mut batch = QuadBatch::new();
        canvas.flush_into(&mut batch);
        assert_eq!(batch.quad_count(), 1);
        assert!(canvas.quads().is_empty());
    }
}
