//! canvas_input - host-independent input vocabulary for annotation surfaces
//!
//! Hosts (a browser shell, a native window, a scripted replay) translate their
//! native events into [`InputEvent`] values and hand them to an annotation
//! session. Key listeners attached to the global scope are tracked by
//! [`KeyListeners`] and detached automatically when their [`Subscription`]
//! is dropped.

mod callback;
mod event;
mod geometry;
mod listeners;

pub use callback::Callback;
pub use event::{InputEvent, Key, Modifiers, MouseButton};
pub use geometry::{Point, Rectangle};
pub use listeners::{KeyListeners, Subscription};
