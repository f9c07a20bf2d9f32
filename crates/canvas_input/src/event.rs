use serde::{Deserialize, Serialize};

use crate::Point;

/// Input events an annotation surface responds to.
///
/// Positions are in client space (the host's pixel coordinates), not yet
/// normalized to the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer button pressed over the surface.
    PointerDown {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    /// Pointer moved.
    PointerMove { position: Point },
    /// Pointer button released.
    PointerUp {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    /// Pointer entered the surface.
    PointerEnter { position: Point },
    /// Pointer left the surface.
    PointerLeave { position: Point },
    /// Primary-button click. `detail` is the click count (2 for a double-click).
    Click {
        position: Point,
        #[serde(default = "single_click")]
        detail: u32,
    },
    /// Secondary-button click (context menu request).
    ContextMenu { position: Point },
    /// Wheel scrolled. Positive delta zooms in.
    Wheel { position: Point, delta: f32 },
    /// Keyboard key pressed.
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

fn single_click() -> u32 {
    1
}

impl InputEvent {
    /// The client-space position carried by pointer events.
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerDown { position, .. }
            | InputEvent::PointerMove { position }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::PointerEnter { position }
            | InputEvent::PointerLeave { position }
            | InputEvent::Click { position, .. }
            | InputEvent::ContextMenu { position }
            | InputEvent::Wheel { position, .. } => Some(*position),
            InputEvent::KeyDown { .. } => None,
        }
    }

    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            InputEvent::PointerDown { .. } => "pointer_down",
            InputEvent::PointerMove { .. } => "pointer_move",
            InputEvent::PointerUp { .. } => "pointer_up",
            InputEvent::PointerEnter { .. } => "pointer_enter",
            InputEvent::PointerLeave { .. } => "pointer_leave",
            InputEvent::Click { .. } => "click",
            InputEvent::ContextMenu { .. } => "context_menu",
            InputEvent::Wheel { .. } => "wheel",
            InputEvent::KeyDown { .. } => "key_down",
        }
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard keys (simplified set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_detail_defaults_to_single() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"click","position":{"x":4.0,"y":2.0}}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::Click {
                position: Point::new(4.0, 2.0),
                detail: 1
            }
        );
    }

    #[test]
    fn test_pointer_down_button_defaults_to_left() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"pointer_down","position":{"x":0.0,"y":0.0}}"#)
                .unwrap();
        assert!(matches!(
            event,
            InputEvent::PointerDown {
                button: MouseButton::Left,
                ..
            }
        ));
    }

    #[test]
    fn test_key_events_have_no_position() {
        let event = InputEvent::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::default(),
        };
        assert_eq!(event.position(), None);
        assert_eq!(event.name(), "key_down");
    }
}
