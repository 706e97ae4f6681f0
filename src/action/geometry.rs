//! Beam geometry shared by the retained and immediate render paths.

use glam::Vec2;

use crate::core::types::Colour;
use crate::renderer::quads::QuadVertex;

/// Shape constants for a beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamStyle {
    /// Half-width at the source end relative to the target end.
    pub source_width_factor: f32,
    /// Alpha at the source end relative to the target end.
    pub tail_alpha_factor: f32,
}

impl Default for BeamStyle {
    fn default() -> Self {
        Self {
            source_width_factor: 0.3,
            tail_alpha_factor: 0.1,
        }
    }
}

/// Unit direction from `src` to `dest`.
///
/// Coincident (or non-finite) endpoints have no direction; the unit x axis
/// is used instead so the quad stays finite.
pub fn beam_direction(src: Vec2, dest: Vec2) -> Vec2 {
    (dest - src).try_normalize().unwrap_or(Vec2::X)
}

/// The four corners of a beam from `src` to `dest`.
///
/// Narrow and faint at the source, `target_size` wide and opaque-ish at the
/// target. Alpha at the target end is `1 - progress`.
pub fn beam_quad(
    src: Vec2,
    dest: Vec2,
    target_size: f32,
    colour: Colour,
    progress: f32,
    style: BeamStyle,
) -> [QuadVertex; 4] {
    let n = beam_direction(src, dest);
    let perp = n.perp();

    let offset = perp * target_size * 0.5;
    let offset_src = offset * style.source_width_factor;

    let alpha = 1.0 - progress;
    let tail_alpha = alpha * style.tail_alpha_factor;

    let head = colour.extend(alpha);
    let tail = colour.extend(tail_alpha);

    [
        QuadVertex::new(src - offset_src, tail, Vec2::new(0.0, 0.0)),
        QuadVertex::new(src + offset_src, tail, Vec2::new(0.0, 1.0)),
        QuadVertex::new(dest + offset, head, Vec2::new(1.0, 1.0)),
        QuadVertex::new(dest - offset, head, Vec2::new(1.0, 0.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_horizontal_beam() {
        let quad = beam_quad(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            2.0,
            Colour::new(0.0, 1.0, 0.0),
            0.5,
            BeamStyle::default(),
        );

        assert!(close(quad[0].position(), Vec2::new(0.0, -0.3)));
        assert!(close(quad[1].position(), Vec2::new(0.0, 0.3)));
        assert!(close(quad[2].position(), Vec2::new(10.0, 1.0)));
        assert!(close(quad[3].position(), Vec2::new(10.0, -1.0)));

        assert!((quad[0].alpha() - 0.05).abs() < 1e-6);
        assert!((quad[1].alpha() - 0.05).abs() < 1e-6);
        assert!((quad[2].alpha() - 0.5).abs() < 1e-6);
        assert!((quad[3].alpha() - 0.5).abs() < 1e-6);

        assert_eq!(quad[0].colour[..3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_tex_coords_are_fixed_square() {
        let quad = beam_quad(
            Vec2::new(5.0, 5.0),
            Vec2::new(-3.0, 8.0),
            4.0,
            Colour::ONE,
            0.0,
            BeamStyle::default(),
        );
        assert_eq!(quad[0].tex_coord, [0.0, 0.0]);
        assert_eq!(quad[1].tex_coord, [0.0, 1.0]);
        assert_eq!(quad[2].tex_coord, [1.0, 1.0]);
        assert_eq!(quad[3].tex_coord, [1.0, 0.0]);
    }

    #[test]
    fn test_vertical_beam_widens_along_x() {
        let quad = beam_quad(
            Vec2::ZERO,
            Vec2::new(0.0, 4.0),
            2.0,
            Colour::ONE,
            0.0,
            BeamStyle::default(),
        );
        // perp of (0, 1) is (-1, 0)
        assert!(close(quad[2].position(), Vec2::new(-1.0, 4.0)));
        assert!(close(quad[3].position(), Vec2::new(1.0, 4.0)));
    }

    #[test]
    fn test_coincident_endpoints_stay_finite() {
        let p = Vec2::new(3.0, 3.0);
        assert_eq!(beam_direction(p, p), Vec2::X);

        let quad = beam_quad(p, p, 2.0, Colour::ONE, 0.25, BeamStyle::default());
        assert!(quad.iter().all(|v| v.is_finite()));
        assert!(close(quad[2].position(), Vec2::new(3.0, 4.0)));
    }
}
