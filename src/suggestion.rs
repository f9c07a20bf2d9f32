//! Display layer for AI suggestions.
//!
//! The overlay lays out the suggestions an inference service returned and
//! turns presses into caller messages. The suggestion lifecycle (pending,
//! accepted, rejected) belongs to the caller; the overlay only remembers which
//! entry is hovered and which is selected.

use canvas_input::Callback;
use serde::{Deserialize, Serialize};

use crate::model::{BoxGeometry, Point};

/// Lifecycle of a suggestion, owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// A proposed box from the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    /// Normalized bounds.
    pub bbox: BoxGeometry,
    pub confidence: f32,
    #[serde(default)]
    pub status: SuggestionStatus,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, bbox: BoxGeometry, confidence: f32) -> Self {
        Self {
            id: id.into(),
            bbox,
            confidence,
            status: SuggestionStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }
}

/// Placement as percentages of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PercentRect {
    pub fn from_normalized(bbox: &BoxGeometry) -> Self {
        Self {
            left: bbox.x * 100.0,
            top: bbox.y * 100.0,
            width: bbox.width * 100.0,
            height: bbox.height * 100.0,
        }
    }

    /// Inline style for absolutely positioned markup.
    pub fn css(&self) -> String {
        format!(
            "left: {}%; top: {}%; width: {}%; height: {}%;",
            self.left, self.top, self.width, self.height
        )
    }
}

/// One rendered suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    pub id: String,
    pub rect: PercentRect,
    /// Confidence badge text, e.g. `87%`.
    pub caption: String,
    pub hovered: bool,
    pub selected: bool,
}

/// What was pressed inside the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayTarget {
    Body(String),
    AcceptButton(String),
    RejectButton(String),
}

/// Hover/selection state plus the caller's intent handlers.
pub struct SuggestionOverlay<M> {
    hovered: Option<String>,
    selected: Option<String>,
    on_accept: Callback<String, M>,
    on_reject: Callback<String, M>,
    on_select: Callback<String, M>,
    on_hover: Callback<Option<String>, M>,
}

impl<M> Default for SuggestionOverlay<M> {
    fn default() -> Self {
        Self {
            hovered: None,
            selected: None,
            on_accept: Callback::none(),
            on_reject: Callback::none(),
            on_select: Callback::none(),
            on_hover: Callback::none(),
        }
    }
}

impl<M> SuggestionOverlay<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_accept<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> M + 'static,
    {
        self.on_accept = Callback::new(f);
        self
    }

    pub fn on_reject<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> M + 'static,
    {
        self.on_reject = Callback::new(f);
        self
    }

    pub fn on_select<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> M + 'static,
    {
        self.on_select = Callback::new(f);
        self
    }

    pub fn on_hover<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<String>) -> M + 'static,
    {
        self.on_hover = Callback::new(f);
        self
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Lay out the pending suggestions in input order.
    pub fn layout(&self, suggestions: &[Suggestion]) -> Vec<OverlayItem> {
        suggestions
            .iter()
            .filter(|s| s.is_pending())
            .map(|s| OverlayItem {
                id: s.id.clone(),
                rect: PercentRect::from_normalized(&s.bbox),
                caption: format!("{:.0}%", s.confidence * 100.0),
                hovered: self.hovered.as_deref() == Some(s.id.as_str()),
                selected: self.selected.as_deref() == Some(s.id.as_str()),
            })
            .collect()
    }

    /// Handle a press. The accept and reject buttons stop propagation, so
    /// pressing them never selects the suggestion underneath.
    pub fn press(&mut self, target: OverlayTarget) -> Option<M> {
        match target {
            OverlayTarget::Body(id) => {
                log::debug!("Suggestion {} selected", id);
                self.selected = Some(id.clone());
                self.on_select.call(id)
            }
            OverlayTarget::AcceptButton(id) => {
                log::debug!("Suggestion {} accept requested", id);
                self.on_accept.call(id)
            }
            OverlayTarget::RejectButton(id) => {
                log::debug!("Suggestion {} reject requested", id);
                self.on_reject.call(id)
            }
        }
    }

    /// Update the hovered entry. Emits only when it changes.
    pub fn hover(&mut self, id: Option<String>) -> Option<M> {
        if self.hovered == id {
            return None;
        }
        self.hovered = id.clone();
        self.on_hover.call(id)
    }

    /// Topmost pending suggestion under a normalized point.
    pub fn hit_test<'a>(&self, point: Point, suggestions: &'a [Suggestion]) -> Option<&'a Suggestion> {
        suggestions
            .iter()
            .rev()
            .filter(|s| s.is_pending())
            .find(|s| s.bbox.contains(point))
    }
}

impl<M> std::fmt::Debug for SuggestionOverlay<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionOverlay")
            .field("hovered", &self.hovered)
            .field("selected", &self.selected)
            .finish()
    }
}
