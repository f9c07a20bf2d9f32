//! Data models for the annotation core.

mod annotation;
mod id;

pub use annotation::{
    AnnotationTool, BoxAnnotation, BoxGeometry, BoxPatch, PolygonAnnotation, ShapeId, ShapeKind,
};
pub use canvas_input::Point;
pub use id::{IdGenerator, IdStrategy, SequentialIds, UuidIds};
