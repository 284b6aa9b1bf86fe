// Driftchat Core — Drag Geometry
//
// Plain pixel math shared by every draggable surface. Coordinates are f64
// because pointer events report fractional pixels under page zoom.

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates (top-left origin, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Component-wise difference, used for grab offsets.
    pub fn minus(self, other: Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Width and height of a surface or the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Size { w, h }
    }
}

/// Clamp a surface's top-left corner so its full bounding box stays inside
/// the viewport: `0 <= x <= viewport.w - surface.w` and likewise for y.
///
/// A viewport smaller than the surface pins the surface to the top-left
/// rather than producing a negative bound.
pub fn clamp_position(raw: Point, surface: Size, viewport: Size) -> Point {
    let max_x = (viewport.w - surface.w).max(0.0);
    let max_y = (viewport.h - surface.h).max(0.0);
    Point {
        x: raw.x.clamp(0.0, max_x),
        y: raw.y.clamp(0.0, max_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size { w: 1280.0, h: 800.0 };
    const SURFACE: Size = Size { w: 60.0, h: 60.0 };

    #[test]
    fn in_bounds_position_is_unchanged() {
        let p = clamp_position(Point::new(100.0, 200.0), SURFACE, VIEWPORT);
        assert_eq!(p, Point::new(100.0, 200.0));
    }

    #[test]
    fn negative_coordinates_clamp_to_zero() {
        let p = clamp_position(Point::new(-50.0, -1.0), SURFACE, VIEWPORT);
        assert_eq!(p, Point::ZERO);
    }

    #[test]
    fn overflow_clamps_to_viewport_minus_surface() {
        let p = clamp_position(Point::new(9999.0, 9999.0), SURFACE, VIEWPORT);
        assert_eq!(p, Point::new(1280.0 - 60.0, 800.0 - 60.0));
    }

    #[test]
    fn viewport_smaller_than_surface_pins_to_origin() {
        let tiny = Size::new(40.0, 40.0);
        let p = clamp_position(Point::new(10.0, 10.0), SURFACE, tiny);
        assert_eq!(p, Point::ZERO, "negative bound must collapse to zero, not flip the clamp");
    }

    #[test]
    fn exact_edge_position_is_kept() {
        let p = clamp_position(Point::new(1220.0, 740.0), SURFACE, VIEWPORT);
        assert_eq!(p, Point::new(1220.0, 740.0));
    }
}
