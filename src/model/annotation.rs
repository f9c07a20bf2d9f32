//! Annotation tool types and shape data structures.
//!
//! All coordinates here are normalized: fractions (0-1) of the annotation
//! surface's rendered width and height.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::model::Point;

/// Identifier of a committed box or polygon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The kind of a committed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Polygon,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Polygon => "polygon",
        }
    }
}

/// Interaction tools. Exactly one is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationTool {
    /// Drag to draw a box
    #[default]
    Draw,
    /// Select and drag existing shapes
    Move,
    /// Click to place polygon vertices
    Polygon,
}

impl AnnotationTool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationTool::Draw => "Draw",
            AnnotationTool::Move => "Move",
            AnnotationTool::Polygon => "Polygon",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [AnnotationTool] {
        &[
            AnnotationTool::Draw,
            AnnotationTool::Move,
            AnnotationTool::Polygon,
        ]
    }

    /// Check if this tool creates shapes (not Move).
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, AnnotationTool::Move)
    }
}

/// Axis-aligned rectangle geometry with non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxGeometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalize a drag rectangle whose extent may be negative.
    ///
    /// `(x, y)` is the drag origin; the result has its origin at the true
    /// top-left corner and a non-negative width and height.
    pub fn from_drag(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x: if width < 0.0 { x + width } else { x },
            y: if height < 0.0 { y + height } else { y },
            width: width.abs(),
            height: height.abs(),
        }
    }

    /// Check if a point is inside the box (edges included).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// A committed box annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    pub id: ShapeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
    pub color: String,
}

impl BoxAnnotation {
    pub fn new(
        id: ShapeId,
        geometry: BoxGeometry,
        label: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            label: label.into(),
            color: color.into(),
        }
    }

    pub fn geometry(&self) -> BoxGeometry {
        BoxGeometry::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_geometry(&mut self, geometry: BoxGeometry) {
        self.x = geometry.x;
        self.y = geometry.y;
        self.width = geometry.width;
        self.height = geometry.height;
    }

    pub fn contains(&self, point: Point) -> bool {
        self.geometry().contains(point)
    }

    /// Apply a partial update. Width and height are re-normalized so the
    /// stored extent is never negative.
    pub fn apply(&mut self, patch: &BoxPatch) -> Result<(), AnnotationError> {
        let raw = BoxGeometry::new(
            patch.x.unwrap_or(self.x),
            patch.y.unwrap_or(self.y),
            patch.width.unwrap_or(self.width),
            patch.height.unwrap_or(self.height),
        );
        if ![raw.x, raw.y, raw.width, raw.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(AnnotationError::invalid_geometry(format!(
                "non-finite value in update for {}",
                self.id
            )));
        }
        self.set_geometry(BoxGeometry::from_drag(raw.x, raw.y, raw.width, raw.height));
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        Ok(())
    }
}

/// Partial update for a box. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl BoxPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Default::default()
        }
    }

    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }
}

/// A committed polygon annotation (closed, at least three vertices).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonAnnotation {
    pub id: ShapeId,
    pub points: Vec<Point>,
    pub label: String,
}

impl PolygonAnnotation {
    pub fn new(id: ShapeId, points: Vec<Point>, label: impl Into<String>) -> Self {
        Self {
            id,
            points,
            label: label.into(),
        }
    }

    /// Point-in-polygon test using ray casting.
    pub fn contains(&self, point: Point) -> bool {
        let vertices = &self.points;
        if vertices.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (vi, vj) = (vertices[i], vertices[j]);
            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Get the bounding box of the polygon.
    pub fn bounding_box(&self) -> Option<BoxGeometry> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(BoxGeometry::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Shift every vertex by a delta.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }
}
