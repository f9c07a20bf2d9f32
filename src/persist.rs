//! Shapes as they cross the persistence boundary.
//!
//! The core never performs I/O. Commits are emitted as
//! [`Effect::Save`](crate::session::Effect) carrying a [`ShapeRecord`]; the
//! host sends it to the save endpoint and reports the outcome back through
//! [`Session::resolve_save`](crate::session::Session::resolve_save). Local
//! state is updated optimistically, and the [`FailurePolicy`] decides what a
//! failed write does to it.

use serde::{Deserialize, Serialize};

use crate::model::{BoxAnnotation, PolygonAnnotation, ShapeId, ShapeKind};

/// A committed shape in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeRecord {
    Box(BoxAnnotation),
    Polygon(PolygonAnnotation),
}

impl ShapeRecord {
    pub fn id(&self) -> &ShapeId {
        match self {
            ShapeRecord::Box(b) => &b.id,
            ShapeRecord::Polygon(p) => &p.id,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeRecord::Box(_) => ShapeKind::Box,
            ShapeRecord::Polygon(_) => ShapeKind::Polygon,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ShapeRecord::Box(b) => &b.label,
            ShapeRecord::Polygon(p) => &p.label,
        }
    }
}

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub project_id: String,
    pub image_id: String,
    pub annotation: ShapeRecord,
}

impl SavePayload {
    pub fn new(project_id: impl Into<String>, image_id: impl Into<String>, annotation: ShapeRecord) -> Self {
        Self {
            project_id: project_id.into(),
            image_id: image_id.into(),
            annotation,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Initial shapes for an image, as returned by the load endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotations {
    #[serde(default)]
    pub boxes: Vec<BoxAnnotation>,
    #[serde(default)]
    pub polygons: Vec<PolygonAnnotation>,
}

impl ImageAnnotations {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// REST paths of the persistence collaborator.
pub mod endpoints {
    use crate::model::ShapeId;

    const BASE: &str = "/api/v1/annotations";

    /// `POST` target for saving a shape on an image.
    pub fn save_path(project_id: &str, image_id: &str) -> String {
        format!("{BASE}/{project_id}/{image_id}")
    }

    /// `DELETE` target for a shape.
    pub fn delete_path(annotation_id: &ShapeId) -> String {
        format!("{BASE}/{annotation_id}")
    }
}

/// Persistence state of a committed shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Write emitted, outcome not yet reported.
    Pending,
    /// Matches the server.
    #[default]
    Saved,
    /// Last write failed; kept locally and flagged.
    Failed(String),
}

/// What a failed write does to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Undo the local change (drop the new shape, restore the deleted one).
    Revert,
    /// Keep the local change and flag it for retry.
    #[default]
    FlagUnsaved,
}
