//! Error types for the annotation core.

use thiserror::Error;

use crate::model::{AnnotationTool, ShapeId};

/// Errors returned by annotation session operations.
///
/// None of these are fatal: the session state is unchanged when one is
/// returned and the user can keep interacting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    /// The surface has no usable extent, so pointer positions cannot be normalized.
    #[error("Annotation surface has no usable size ({width}x{height})")]
    EmptySurface {
        /// Rendered surface width
        width: f32,
        /// Rendered surface height
        height: f32,
    },

    /// No box or polygon with this id is in the store.
    #[error("Unknown shape: {0}")]
    UnknownShape(ShapeId),

    /// The id refers to a polygon where a box was required.
    #[error("Shape {0} is not a box")]
    NotABox(ShapeId),

    /// Tool changes are refused while a box drag is in progress.
    #[error("Cannot switch to {requested:?} while a box is being drawn")]
    ToolSwitchWhileDrawing {
        /// The tool that was requested
        requested: AnnotationTool,
    },

    /// Box geometry would be degenerate after the update.
    #[error("Invalid box geometry: {message}")]
    InvalidGeometry {
        /// Description of the geometry error
        message: String,
    },
}

impl AnnotationError {
    /// Create an invalid geometry error with a message.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }
}

/// Errors reported back by the persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// Request never reached the server or timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a failure status.
    #[error("Server rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Server-provided message
        message: String,
    },
}
