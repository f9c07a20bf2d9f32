//! Scripted sessions.
//!
//! A replay script is a JSON document describing a surface, initial shapes and
//! a list of steps (input events, tool changes, persistence results). Running
//! it drives a [`Session`] exactly as a host would and reports the resulting
//! shapes and effects, which makes interaction bugs reproducible outside a
//! browser.

use std::path::Path;

use canvas_input::{InputEvent, Rectangle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SessionConfig};
use crate::error::{AnnotationError, PersistError};
use crate::model::{AnnotationTool, BoxAnnotation, BoxPatch, PolygonAnnotation, SequentialIds, ShapeId};
use crate::persist::ImageAnnotations;
use crate::session::{Effect, Session};

/// A recorded interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Client-space container the surface is laid out in.
    pub container: Rectangle,
    #[serde(default)]
    pub tool: AnnotationTool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub initial: ImageAnnotations,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Deliver an input event.
    Event(InputEvent),
    SetTool {
        tool: AnnotationTool,
    },
    SetLabel {
        label: String,
    },
    Resize {
        container: Rectangle,
    },
    UpdateBox {
        id: ShapeId,
        patch: BoxPatch,
    },
    Delete {
        id: ShapeId,
    },
    /// Report the outcome of a save.
    ResolveSave {
        id: ShapeId,
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Report the outcome of a delete.
    ResolveDelete {
        id: ShapeId,
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    RetryUnsaved,
}

/// Final state after running a script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub tool: AnnotationTool,
    pub boxes: Vec<BoxAnnotation>,
    pub polygons: Vec<PolygonAnnotation>,
    pub selected: Vec<ShapeId>,
    pub effects: Vec<Effect>,
    /// Warning messages as shown to the user, in order.
    pub warnings: Vec<String>,
    pub unsaved: Vec<ShapeId>,
}

/// Errors that abort a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: AnnotationError,
    },
}

fn outcome(ok: bool, error: Option<String>) -> Result<(), PersistError> {
    if ok {
        Ok(())
    } else {
        Err(PersistError::Network(
            error.unwrap_or_else(|| "request failed".to_string()),
        ))
    }
}

/// Run a script to completion.
///
/// Ids are always sequential (`box-1`, `polygon-2`, ...) so that scripts can
/// refer to shapes they create.
pub fn run_script(script: &ReplayScript, config: SessionConfig) -> Result<ReplayReport, ReplayError> {
    config.validate()?;
    let mut session = Session::with_id_generator(config, Box::new(SequentialIds::new()))
        .with_container(script.container);
    session.load(script.initial.clone());
    if let Some(label) = &script.label {
        session.set_label(label.clone());
    }
    session
        .set_tool(script.tool)
        .map_err(|source| ReplayError::Step { index: 0, source })?;

    let mut effects = Vec::new();
    for (index, step) in script.steps.iter().enumerate() {
        log::debug!("Step {}: {:?}", index, step);
        let step_error = |source| ReplayError::Step { index, source };
        match step {
            ReplayStep::Event(event) => session.handle_event(event),
            ReplayStep::SetTool { tool } => {
                // A refused switch is reported through a warning effect.
                if let Err(e) = session.set_tool(*tool) {
                    log::info!("Step {}: {}", index, e);
                }
            }
            ReplayStep::SetLabel { label } => session.set_label(label.clone()),
            ReplayStep::Resize { container } => session.set_container(*container),
            ReplayStep::UpdateBox { id, patch } => {
                session.update_box(id, patch).map_err(step_error)?;
            }
            ReplayStep::Delete { id } => session.delete(id).map_err(step_error)?,
            ReplayStep::ResolveSave { id, ok, error } => {
                session.resolve_save(id, outcome(*ok, error.clone()));
            }
            ReplayStep::ResolveDelete { id, ok, error } => {
                session.resolve_delete(id, outcome(*ok, error.clone()));
            }
            ReplayStep::RetryUnsaved => {
                session.retry_unsaved();
            }
        }
        effects.extend(session.take_effects());
    }

    let warnings = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Warn(w) => Some(w.to_string()),
            _ => None,
        })
        .collect();
    let store = session.store();
    let selected = store
        .selected_box()
        .into_iter()
        .chain(store.selected_polygon())
        .cloned()
        .collect();

    log::info!(
        "Replayed {} steps: {} boxes, {} polygons, {} effects",
        script.steps.len(),
        store.boxes().len(),
        store.polygons().len(),
        effects.len()
    );

    Ok(ReplayReport {
        tool: session.tool(),
        boxes: store.boxes().to_vec(),
        polygons: store.polygons().to_vec(),
        selected,
        unsaved: session.unsaved(),
        effects,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLYGON_SCRIPT: &str = r#"{
        "container": {"x": 0.0, "y": 0.0, "width": 200.0, "height": 100.0},
        "tool": "polygon",
        "label": "roof",
        "steps": [
            {"step": "event", "type": "click", "position": {"x": 20.0, "y": 10.0}},
            {"step": "event", "type": "click", "position": {"x": 100.0, "y": 10.0}},
            {"step": "event", "type": "context_menu", "position": {"x": 100.0, "y": 10.0}},
            {"step": "event", "type": "click", "position": {"x": 60.0, "y": 80.0}},
            {"step": "event", "type": "click", "position": {"x": 60.0, "y": 80.0}, "detail": 2},
            {"step": "resolve_save", "id": "polygon-1", "ok": false, "error": "offline"}
        ]
    }"#;

    #[test]
    fn test_polygon_script() {
        let script = ReplayScript::from_json(POLYGON_SCRIPT).unwrap();
        let report = run_script(&script, SessionConfig::default()).unwrap();

        assert_eq!(report.polygons.len(), 1);
        let polygon = &report.polygons[0];
        assert_eq!(polygon.id.as_str(), "polygon-1");
        assert_eq!(polygon.label, "roof");
        assert_eq!(polygon.points[1].x, 0.5);
        assert_eq!(polygon.points[2].y, 0.8);

        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].starts_with("need at least 3 points"));
        assert!(report.warnings[1].contains("offline"));
        assert_eq!(report.unsaved, vec![ShapeId::new("polygon-1")]);
        assert_eq!(report.selected, vec![ShapeId::new("polygon-1")]);
    }

    #[test]
    fn test_box_script_with_initial_shapes() {
        let json = r##"{
            "container": {"x": 10.0, "y": 10.0, "width": 100.0, "height": 100.0},
            "initial": {"boxes": [
                {"id": "old", "x": 0.5, "y": 0.5, "width": 0.2, "height": 0.2, "label": "car", "color": "#ff0000"}
            ]},
            "steps": [
                {"step": "event", "type": "pointer_down", "position": {"x": 60.0, "y": 60.0}},
                {"step": "event", "type": "pointer_move", "position": {"x": 30.0, "y": 40.0}},
                {"step": "set_tool", "tool": "move"},
                {"step": "event", "type": "pointer_up", "position": {"x": 30.0, "y": 40.0}},
                {"step": "delete", "id": "old"}
            ]
        }"##;
        let script = ReplayScript::from_json(json).unwrap();
        let report = run_script(&script, SessionConfig::default()).unwrap();

        assert_eq!(report.tool, AnnotationTool::Draw);
        assert_eq!(report.boxes.len(), 1);
        let b = &report.boxes[0];
        assert_eq!(b.id.as_str(), "box-1");
        assert!((b.x - 0.2).abs() < 1e-5);
        assert!((b.y - 0.3).abs() < 1e-5);
        assert!((b.width - 0.3).abs() < 1e-5);
        assert!((b.height - 0.2).abs() < 1e-5);
        assert!(matches!(report.effects.last(), Some(Effect::Delete(id)) if id.as_str() == "old"));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_delete_aborts_with_step_index() {
        let json = r#"{
            "container": {"x": 0.0, "y": 0.0, "width": 100.0, "height": 100.0},
            "steps": [
                {"step": "set_label", "label": "x"},
                {"step": "delete", "id": "ghost"}
            ]
        }"#;
        let script = ReplayScript::from_json(json).unwrap();
        let err = run_script(&script, SessionConfig::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Step { index: 1, .. }));
    }

    #[test]
    fn test_report_serializes_effects() {
        let script = ReplayScript::from_json(POLYGON_SCRIPT).unwrap();
        let report = run_script(&script, SessionConfig::default()).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["effects"][0]["kind"], "warn");
        assert_eq!(value["effects"][1]["kind"], "save");
        assert_eq!(value["effects"][1]["value"]["type"], "polygon");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let script = ReplayScript::from_json(POLYGON_SCRIPT).unwrap();
        let config = SessionConfig {
            min_polygon_points: 1,
            ..SessionConfig::default()
        };
        assert!(matches!(
            run_script(&script, config),
            Err(ReplayError::Config(_))
        ));
    }
}
