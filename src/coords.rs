//! Client-space to normalized surface coordinates.
//!
//! The mapper subtracts the surface's rendered origin and divides by its
//! rendered size, so every stored coordinate is a fraction of the surface and
//! independent of pixel dimensions or zoom.

use canvas_input::Rectangle;
use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::model::Point;

/// What to do with positions captured outside the surface (fast drags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampPolicy {
    /// Clamp both axes to [0, 1].
    #[default]
    Clamp,
    /// Keep the raw ratio, which may fall outside [0, 1].
    Overflow,
}

/// Maps client positions into the unit square of a rendered surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    bounds: Rectangle,
    clamp: ClampPolicy,
}

impl CoordinateMapper {
    pub fn new(bounds: Rectangle, clamp: ClampPolicy) -> Self {
        Self { bounds, clamp }
    }

    /// The rendered surface bounds in client space.
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
    }

    pub fn clamp_policy(&self) -> ClampPolicy {
        self.clamp
    }

    /// Convert a client-space position to normalized surface coordinates.
    pub fn to_normalized(&self, client: Point) -> Result<Point, AnnotationError> {
        if self.bounds.is_empty() {
            return Err(AnnotationError::EmptySurface {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }
        let x = (client.x - self.bounds.x) / self.bounds.width;
        let y = (client.y - self.bounds.y) / self.bounds.height;
        Ok(match self.clamp {
            ClampPolicy::Clamp => Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)),
            ClampPolicy::Overflow => Point::new(x, y),
        })
    }

    /// Convert normalized coordinates back to client space.
    pub fn to_client(&self, normalized: Point) -> Point {
        Point::new(
            self.bounds.x + normalized.x * self.bounds.width,
            self.bounds.y + normalized.y * self.bounds.height,
        )
    }
}
