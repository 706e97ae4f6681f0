//! Orthographic 2D camera.

use glam::{Mat4, Vec2};

const MIN_ZOOM: f32 = 0.01;
const MAX_ZOOM: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub center: Vec2,
    /// World units per screen pixel (lower = zoomed in).
    pub zoom: f32,
    /// Screen dimensions in pixels.
    pub viewport_size: Vec2,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl CameraState {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
            viewport_size: Vec2::new(viewport_width, viewport_height),
        }
    }

    /// Screen origin is top-left, Y increases downward.
    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        let scaled = (world_pos - self.center) / self.zoom;
        Vec2::new(
            self.viewport_size.x / 2.0 + scaled.x,
            self.viewport_size.y / 2.0 - scaled.y,
        )
    }

    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        let centered = Vec2::new(
            screen_pos.x - self.viewport_size.x / 2.0,
            self.viewport_size.y / 2.0 - screen_pos.y,
        );
        self.center + centered * self.zoom
    }

    /// World to clip space (-1 to 1).
    pub fn view_projection_matrix(&self) -> Mat4 {
        let (min, max) = self.visible_bounds();
        Mat4::orthographic_rh(min.x, max.x, min.y, max.y, -1.0, 1.0)
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.center += delta;
    }

    /// Zoom keeping the world point under `screen_pos` fixed.
    /// factor < 1.0 zooms in, factor > 1.0 zooms out.
    pub fn zoom_toward(&mut self, screen_pos: Vec2, factor: f32) {
        let world_before = self.screen_to_world(screen_pos);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let world_after = self.screen_to_world(screen_pos);
        self.center += world_before - world_after;
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport_size = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// Centre on a world-space box and zoom so it fits with `margin` pixels spare.
    pub fn fit(&mut self, min: Vec2, max: Vec2, margin: f32) {
        self.center = (min + max) * 0.5;
        let extent = (max - min).max(Vec2::splat(1.0));
        let usable = (self.viewport_size - Vec2::splat(2.0 * margin)).max(Vec2::splat(1.0));
        let zoom = (extent / usable).max_element();
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Visible world bounds (min, max).
    pub fn visible_bounds(&self) -> (Vec2, Vec2) {
        let half = self.viewport_size * self.zoom / 2.0;
        (self.center - half, self.center + half)
    }
}
