//! Draw state machine for boxes and polygons.
//!
//! ```text
//!   Idle --begin_box--> DrawingBox --update_box--> DrawingBox
//!   DrawingBox --end_box--> Idle              (commit or discard)
//!   Idle --add_polygon_point--> BuildingPolygon --add_polygon_point--> BuildingPolygon
//!   BuildingPolygon --finalize_polygon / cancel_polygon--> Idle
//! ```
//!
//! The machine holds only the in-progress shape. Committed shapes live in the
//! [`AnnotationStore`](crate::store::AnnotationStore); tool routing happens in
//! the [`Session`](crate::session::Session).

use crate::model::{BoxGeometry, Point};

/// The shape currently being drawn.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawState {
    /// Not drawing anything.
    #[default]
    Idle,
    /// Dragging out a box from `start`.
    DrawingBox { start: Point, current: Point },
    /// Collecting polygon vertices.
    BuildingPolygon { points: Vec<Point> },
}

/// In-progress box with signed extent, as seen during a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Why a polygon finalize did not produce a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonRejection {
    /// No polygon is being built.
    NotBuilding,
    /// Too few vertices buffered.
    TooFewPoints { needed: usize, got: usize },
}

/// Holds the in-progress shape and applies transitions.
#[derive(Debug, Clone, Default)]
pub struct DrawMachine {
    state: DrawState,
}

impl DrawMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DrawState::Idle)
    }

    pub fn is_drawing_box(&self) -> bool {
        matches!(self.state, DrawState::DrawingBox { .. })
    }

    pub fn is_building_polygon(&self) -> bool {
        matches!(self.state, DrawState::BuildingPolygon { .. })
    }

    // ------------------------------------------------------------------
    // Boxes
    // ------------------------------------------------------------------

    /// Start a box at `start` with zero extent. Replaces any in-progress shape.
    pub fn begin_box(&mut self, start: Point) {
        if !self.is_idle() {
            log::debug!("Box started over in-progress state {:?}", self.state);
        }
        self.state = DrawState::DrawingBox {
            start,
            current: start,
        };
    }

    /// Track the pointer while dragging. Returns false if no box is in progress.
    pub fn update_box(&mut self, current: Point) -> bool {
        if let DrawState::DrawingBox { current: c, .. } = &mut self.state {
            *c = current;
            true
        } else {
            false
        }
    }

    /// The box being dragged, with signed width/height.
    pub fn pending_box(&self) -> Option<RawBox> {
        match self.state {
            DrawState::DrawingBox { start, current } => Some(RawBox {
                x: start.x,
                y: start.y,
                width: current.x - start.x,
                height: current.y - start.y,
            }),
            _ => None,
        }
    }

    /// Finish the drag and return to idle.
    ///
    /// Returns the normalized geometry only when both `|width|` and `|height|`
    /// exceed `min_extent`; smaller drags are discarded.
    pub fn end_box(&mut self, min_extent: f32) -> Option<BoxGeometry> {
        let raw = self.pending_box()?;
        self.state = DrawState::Idle;
        if raw.width.abs() > min_extent && raw.height.abs() > min_extent {
            Some(BoxGeometry::from_drag(raw.x, raw.y, raw.width, raw.height))
        } else {
            log::debug!(
                "Box discarded: extent {:.5}x{:.5} not above {}",
                raw.width,
                raw.height,
                min_extent
            );
            None
        }
    }

    // ------------------------------------------------------------------
    // Polygons
    // ------------------------------------------------------------------

    /// Append a vertex, starting a polygon if idle. Returns the buffer length.
    pub fn add_polygon_point(&mut self, point: Point) -> usize {
        match &mut self.state {
            DrawState::BuildingPolygon { points } => {
                points.push(point);
                points.len()
            }
            other => {
                if !matches!(other, DrawState::Idle) {
                    log::debug!("Polygon started over in-progress state {:?}", other);
                }
                self.state = DrawState::BuildingPolygon {
                    points: vec![point],
                };
                1
            }
        }
    }

    /// Buffered polygon vertices (empty when not building).
    pub fn polygon_buffer(&self) -> &[Point] {
        match &self.state {
            DrawState::BuildingPolygon { points } => points,
            _ => &[],
        }
    }

    /// Promote the buffer to a finished vertex list if it has at least
    /// `min_points` vertices. On rejection the buffer is left untouched.
    pub fn finalize_polygon(&mut self, min_points: usize) -> Result<Vec<Point>, PolygonRejection> {
        let got = match &self.state {
            DrawState::BuildingPolygon { points } => points.len(),
            _ => return Err(PolygonRejection::NotBuilding),
        };
        if got < min_points {
            return Err(PolygonRejection::TooFewPoints {
                needed: min_points,
                got,
            });
        }
        match std::mem::take(&mut self.state) {
            DrawState::BuildingPolygon { points } => Ok(points),
            _ => Err(PolygonRejection::NotBuilding),
        }
    }

    /// Drop the polygon buffer. Returns how many vertices were discarded.
    pub fn cancel_polygon(&mut self) -> usize {
        let discarded = self.polygon_buffer().len();
        if self.is_building_polygon() {
            self.state = DrawState::Idle;
        }
        discarded
    }

    /// Drop whatever is in progress.
    pub fn reset(&mut self) {
        self.state = DrawState::Idle;
    }
}
