//! Global constants for the annotation core.

/// Minimum normalized drag extent (per axis) for a box to be committed.
///
/// Roughly half a percent of the surface; anything smaller is treated as an
/// accidental click. The comparison is strict: an extent equal to this value
/// is discarded.
pub const MIN_DRAG_DISTANCE: f32 = 0.00625;

/// Minimum number of vertices for a polygon to be committed.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Minimum buffered vertices before a double-click finalizes a polygon.
pub const DOUBLE_CLICK_MIN_POINTS: usize = 2;

/// Label assigned to new shapes when the caller has not chosen one.
pub const DEFAULT_LABEL: &str = "object";

/// Color assigned to new boxes when the caller has not chosen one.
pub const DEFAULT_BOX_COLOR: &str = "#ff0000";

/// Zoom constants for the surface view.
pub mod zoom {
    /// Minimum zoom level.
    pub const MIN: f32 = 0.1;
    /// Maximum zoom level.
    pub const MAX: f32 = 20.0;
    /// Zoom factor applied per wheel notch.
    pub const STEP: f32 = 1.1;
}
