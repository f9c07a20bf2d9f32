//! Annotation canvas core.
//!
//! Interactive drawing of bounding boxes and polygons on an image surface:
//! pointer positions are normalized against the rendered surface, a small
//! state machine builds shapes, and a session routes input by the active tool
//! and queues the writes a host must persist.

pub mod config;
pub mod constants;
pub mod coords;
pub mod drawing;
pub mod error;
pub mod model;
pub mod persist;
pub mod replay;
pub mod session;
pub mod store;
pub mod suggestion;
pub mod zoom;

pub use canvas_input::{InputEvent, Key, KeyListeners, Modifiers, MouseButton, Rectangle};
pub use config::{ConfigError, LogLevel, SessionConfig};
pub use coords::{ClampPolicy, CoordinateMapper};
pub use drawing::{DrawMachine, DrawState};
pub use error::{AnnotationError, PersistError};
pub use model::{
    AnnotationTool, BoxAnnotation, BoxGeometry, BoxPatch, Point, PolygonAnnotation, ShapeId,
    ShapeKind,
};
pub use persist::{FailurePolicy, ImageAnnotations, ShapeRecord, SyncState};
pub use session::{Effect, MountedSurface, Session, Warning};
pub use store::AnnotationStore;
pub use suggestion::{Suggestion, SuggestionOverlay, SuggestionStatus};
pub use zoom::ViewTransform;
