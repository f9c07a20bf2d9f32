//! Zoom-to-cursor and drag-to-pan for the annotation surface.
//!
//! The surface is laid out inside a container. Zoom scales it about the
//! container center and pan offsets it; the resulting rendered bounds are what
//! the coordinate mapper normalizes against.

use canvas_input::Rectangle;
use serde::{Deserialize, Serialize};

use crate::constants::zoom as zoom_const;
use crate::model::Point;

/// Allowed zoom range and wheel step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    /// Factor applied per wheel notch
    pub step: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: zoom_const::MIN,
            max: zoom_const::MAX,
            step: zoom_const::STEP,
        }
    }
}

/// Represents pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl ViewTransform {
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Zoom to `new_zoom` keeping the point under the cursor fixed.
    ///
    /// `center` is the container center in client space.
    pub fn zoom_to_cursor(&self, new_zoom: f32, cursor: Point, center: Point) -> ViewTransform {
        let rel_x = cursor.x - center.x;
        let rel_y = cursor.y - center.y;

        // Surface-space point under the cursor before zooming
        let img_x = (rel_x - self.pan_x) / self.zoom;
        let img_y = (rel_y - self.pan_y) / self.zoom;

        ViewTransform {
            zoom: new_zoom,
            pan_x: rel_x - img_x * new_zoom,
            pan_y: rel_y - img_y * new_zoom,
        }
    }

    /// Multiply the zoom by `factor` about the cursor, clamped to `limits`.
    pub fn zoom_by(
        &self,
        factor: f32,
        cursor: Point,
        container: Rectangle,
        limits: &ZoomLimits,
    ) -> ViewTransform {
        let new_zoom = (self.zoom * factor).clamp(limits.min, limits.max);
        if (new_zoom - self.zoom).abs() <= f32::EPSILON {
            return *self;
        }
        self.zoom_to_cursor(new_zoom, cursor, container.center())
    }

    /// Apply a pan delta.
    pub fn pan_by(&self, dx: f32, dy: f32) -> ViewTransform {
        ViewTransform {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }

    /// Rendered bounds of a surface that fills `container` at zoom 1.
    pub fn surface_bounds(&self, container: Rectangle) -> Rectangle {
        let center = container.center();
        let width = container.width * self.zoom;
        let height = container.height * self.zoom;
        Rectangle::new(
            center.x + self.pan_x - width / 2.0,
            center.y + self.pan_y - height / 2.0,
            width,
            height,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Drag-to-pan state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanDrag {
    last: Option<Point>,
}

impl PanDrag {
    pub fn start(&mut self, position: Point) {
        self.last = Some(position);
    }

    /// Delta since the previous position, if a drag is active.
    pub fn update(&mut self, position: Point) -> Option<(f32, f32)> {
        let last = self.last?;
        self.last = Some(position);
        Some((position.x - last.x, position.y - last.y))
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_zoom_to_cursor_at_center() {
        let t = ViewTransform::identity();
        let new_t = t.zoom_to_cursor(2.0, Point::new(100.0, 100.0), Point::new(100.0, 100.0));
        assert_eq!(new_t.zoom, 2.0);
        assert!(approx_eq(new_t.pan_x, 0.0));
        assert!(approx_eq(new_t.pan_y, 0.0));
    }

    #[test]
    fn test_zoom_to_cursor_preserves_cursor_point() {
        let container = Rectangle::new(0.0, 0.0, 200.0, 200.0);
        let t = ViewTransform::new(1.0, 50.0, 30.0);
        let cursor = Point::new(150.0, 120.0);

        let before = t.surface_bounds(container);
        let u = (cursor.x - before.x) / before.width;
        let v = (cursor.y - before.y) / before.height;

        let new_t = t.zoom_to_cursor(2.0, cursor, container.center());
        let after = new_t.surface_bounds(container);

        // The same normalized point stays under the cursor
        assert!(approx_eq((cursor.x - after.x) / after.width, u));
        assert!(approx_eq((cursor.y - after.y) / after.height, v));
    }

    #[test]
    fn test_zoom_by_respects_limits() {
        let container = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let limits = ZoomLimits {
            min: 0.5,
            max: 4.0,
            step: 1.1,
        };
        let t = ViewTransform::new(3.5, 0.0, 0.0);
        let zoomed = t.zoom_by(2.0, container.center(), container, &limits);
        assert_eq!(zoomed.zoom, 4.0);

        let t = ViewTransform::new(0.6, 0.0, 0.0);
        let zoomed = t.zoom_by(0.5, container.center(), container, &limits);
        assert_eq!(zoomed.zoom, 0.5);
    }

    #[test]
    fn test_zoom_by_at_limit_is_noop() {
        let container = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let limits = ZoomLimits::default();
        let t = ViewTransform::new(limits.max, 12.0, -4.0);
        assert_eq!(t.zoom_by(2.0, Point::new(10.0, 10.0), container, &limits), t);
    }

    #[test]
    fn test_identity_surface_fills_container() {
        let container = Rectangle::new(10.0, 20.0, 300.0, 200.0);
        assert_eq!(ViewTransform::identity().surface_bounds(container), container);
    }

    #[test]
    fn test_pan_by() {
        let t = ViewTransform::new(1.0, 10.0, 20.0);
        let new_t = t.pan_by(5.0, -10.0);
        assert_eq!(new_t.zoom, 1.0);
        assert_eq!(new_t.pan_x, 15.0);
        assert_eq!(new_t.pan_y, 10.0);
    }

    #[test]
    fn test_pan_drag_deltas() {
        let mut drag = PanDrag::default();
        assert_eq!(drag.update(Point::new(5.0, 5.0)), None);
        assert_eq!(drag.update(Point::new(9.0, 9.0)), None);
        assert!(!drag.is_active());

        drag.start(Point::new(10.0, 10.0));
        assert_eq!(drag.update(Point::new(15.0, 7.0)), Some((5.0, -3.0)));
        assert_eq!(drag.update(Point::new(15.0, 9.0)), Some((0.0, 2.0)));
        drag.end();
        assert!(!drag.is_active());
    }
}
