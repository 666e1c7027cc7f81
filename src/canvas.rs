//! Mapping between screen pixels and the fixed logical certificate canvas.

use crate::elements::geometry::{Point2D, Size2D};

/// A4 landscape at 72 dpi.
pub const CANVAS_WIDTH: f64 = 842.0;
pub const CANVAS_HEIGHT: f64 = 595.0;

const MIN_SCALE: f64 = 0.01;

/// Uniform scale between the on-screen preview container and the logical canvas.
///
/// Measured fresh for every drag-relevant event: the container may be resized
/// by the responsive layout between two pointer sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasScale{
    scale: f64,
}

impl Default for CanvasScale{
    fn default() -> Self {
        CanvasScale{scale: 1.0}
    }
}

impl CanvasScale{
    /// Derive the scale from the container's on-screen size in pixels.
    /// Falls back to 1.0 when the container is not measurable yet.
    pub fn from_container(width_px: f64, height_px: f64) -> Self {
        if !(width_px.is_finite() && height_px.is_finite()) || width_px <= 0.0 || height_px <= 0.0 {
            return CanvasScale::default();
        }

        let scale = (width_px / CANVAS_WIDTH).min(height_px / CANVAS_HEIGHT);
        CanvasScale{scale: scale.max(MIN_SCALE)}
    }

    pub fn value(&self) -> f64 {
        self.scale
    }

    /// Pointer position (screen px) → logical canvas units.
    pub fn to_logical(&self, pointer: Point2D, origin: Point2D) -> Point2D {
        Point2D::new((pointer.x - origin.x) / self.scale, (pointer.y - origin.y) / self.scale)
    }

    /// Logical canvas units → screen px.
    pub fn to_screen(&self, logical: Point2D, origin: Point2D) -> Point2D {
        Point2D::new(origin.x + logical.x * self.scale, origin.y + logical.y * self.scale)
    }
}

/// Clamp a top-left position so an element of `size` stays on the canvas.
/// An element that has not been laid out is clamped to the full canvas.
pub fn clamp_to_canvas(pos: Point2D, size: Size2D) -> Point2D {
    let (max_x, max_y) = if size.is_empty() {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    } else {
        ((CANVAS_WIDTH - size.width).max(0.0), (CANVAS_HEIGHT - size.height).max(0.0))
    };

    Point2D::new(pos.x.clamp(0.0, max_x), pos.y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_uses_the_tighter_axis() {
        let scale = CanvasScale::from_container(421.0, 595.0);
        assert!((scale.value() - 0.5).abs() < 1e-9);

        let scale = CanvasScale::from_container(1684.0, 595.0);
        assert!((scale.value() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unmeasured_container_defaults_to_one() {
        assert_eq!(CanvasScale::from_container(0.0, 0.0).value(), 1.0);
        assert_eq!(CanvasScale::from_container(f64::NAN, 300.0).value(), 1.0);
    }

    #[test]
    fn tiny_container_is_clamped_to_epsilon() {
        assert_eq!(CanvasScale::from_container(0.001, 0.001).value(), MIN_SCALE);
    }

    #[test]
    fn logical_screen_round_trip() {
        let origin = Point2D::new(37.5, 112.25);
        for container_width in [120.0, 421.0, 842.0, 1263.0, 2000.0] {
            let scale = CanvasScale::from_container(container_width, container_width * CANVAS_HEIGHT / CANVAS_WIDTH);
            for (x, y) in [(0.0, 0.0), (842.0, 595.0), (421.3, 17.9), (1.0, 594.0)] {
                let logical = Point2D::new(x, y);
                let back = scale.to_logical(scale.to_screen(logical, origin), origin);
                assert!((back.x - x).abs() < 1e-9, "x drifted at scale {}", scale.value());
                assert!((back.y - y).abs() < 1e-9, "y drifted at scale {}", scale.value());
            }
        }
    }

    #[test]
    fn clamp_keeps_element_inside() {
        let size = Size2D::new(100.0, 50.0);
        assert_eq!(clamp_to_canvas(Point2D::new(-500.0, 9000.0), size), Point2D::new(0.0, 545.0));
        assert_eq!(clamp_to_canvas(Point2D::new(800.0, -1.0), size), Point2D::new(742.0, 0.0));
    }

    #[test]
    fn clamp_degrades_for_unmeasured_elements() {
        let pos = clamp_to_canvas(Point2D::new(900.0, 700.0), Size2D::default());
        assert_eq!(pos, Point2D::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    }
}
