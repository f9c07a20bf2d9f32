//! Annotation session: routes input events to the draw state machine and store.
//!
//! A [`Session`] is the interaction dispatcher for one annotation surface. Every
//! pointer handler first checks the active [`AnnotationTool`] and does nothing
//! when the event does not apply to it. Side effects the host must carry out
//! (persisting a shape, showing a warning) are queued as [`Effect`]s and
//! drained with [`Session::take_effects`].

mod surface;

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use canvas_input::{InputEvent, Key, Modifiers, MouseButton, Rectangle};
use serde::Serialize;

use crate::config::SessionConfig;
use crate::coords::{ClampPolicy, CoordinateMapper};
use crate::drawing::{DrawMachine, DrawState, PolygonRejection, RawBox};
use crate::error::{AnnotationError, PersistError};
use crate::model::{
    AnnotationTool, BoxAnnotation, BoxGeometry, BoxPatch, IdGenerator, Point, PolygonAnnotation,
    ShapeId, ShapeKind,
};
use crate::persist::{FailurePolicy, ImageAnnotations, ShapeRecord, SyncState};
use crate::store::AnnotationStore;
use crate::suggestion::Suggestion;
use crate::zoom::{PanDrag, ViewTransform};

pub use surface::MountedSurface;

/// Something the host has to act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Effect {
    /// Persist this shape (new or changed).
    Save(ShapeRecord),
    /// Delete this shape remotely.
    Delete(ShapeId),
    /// Show a non-blocking message to the user.
    Warn(Warning),
    /// A local change was rolled back after a failed write.
    Reverted(ShapeId),
}

/// Non-blocking, user-facing warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Right-click finalize with too few vertices; the buffer is kept.
    PolygonTooSmall { needed: usize, got: usize },
    /// Double-click finalize with too few vertices; the buffer was dropped.
    PolygonDiscarded { needed: usize, got: usize },
    /// A tool change was refused because a box is being drawn.
    ToolSwitchRejected { requested: AnnotationTool },
    /// A save was reported as failed.
    SaveFailed { id: ShapeId, reason: String },
    /// A delete was reported as failed.
    DeleteFailed { id: ShapeId, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PolygonTooSmall { needed, got } => {
                write!(f, "need at least {needed} points (have {got})")
            }
            Warning::PolygonDiscarded { needed, got } => {
                write!(f, "polygon discarded: need at least {needed} points (had {got})")
            }
            Warning::ToolSwitchRejected { requested } => {
                write!(
                    f,
                    "finish the current box before switching to {}",
                    requested.name()
                )
            }
            Warning::SaveFailed { id, reason } => write!(f, "could not save {id}: {reason}"),
            Warning::DeleteFailed { id, reason } => write!(f, "could not delete {id}: {reason}"),
        }
    }
}

/// Last confirmed state of a shape with saves in flight.
#[derive(Debug, Clone)]
enum Baseline {
    /// Never confirmed; reverting removes the shape.
    Created,
    Confirmed(ShapeRecord),
}

/// Saves issued for one shape, oldest first.
#[derive(Debug, Clone)]
struct PendingSaves {
    baseline: Baseline,
    in_flight: VecDeque<ShapeRecord>,
}

/// A local delete awaiting confirmation.
#[derive(Debug, Clone)]
struct PendingDelete {
    /// Position within its kind's list when removed.
    index: usize,
    record: ShapeRecord,
}

/// A shape being dragged with the Move tool.
#[derive(Debug, Clone)]
struct MoveDrag {
    id: ShapeId,
    last: Point,
    original: ShapeRecord,
    moved: bool,
}

/// Interaction state for one annotation surface.
pub struct Session {
    config: SessionConfig,
    tool: AnnotationTool,
    container: Rectangle,
    view: ViewTransform,
    mapper: CoordinateMapper,
    draw: DrawMachine,
    store: AnnotationStore,
    ids: Box<dyn IdGenerator>,
    move_drag: Option<MoveDrag>,
    pan: PanDrag,
    pointer_inside: bool,
    current_label: String,
    current_color: String,
    pending_saves: HashMap<ShapeId, PendingSaves>,
    pending_deletes: HashMap<ShapeId, PendingDelete>,
    failed_deletes: HashSet<ShapeId>,
    effects: Vec<Effect>,
}

impl Session {
    /// Create a session with the id generator named in the config.
    pub fn new(config: SessionConfig) -> Self {
        let ids = config.id_strategy.build();
        Self::with_id_generator(config, ids)
    }

    pub fn with_id_generator(config: SessionConfig, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            mapper: CoordinateMapper::new(Rectangle::default(), config.clamp),
            current_label: config.default_label.clone(),
            current_color: config.default_color.clone(),
            config,
            tool: AnnotationTool::default(),
            container: Rectangle::default(),
            view: ViewTransform::identity(),
            draw: DrawMachine::new(),
            store: AnnotationStore::new(),
            ids,
            move_drag: None,
            pan: PanDrag::default(),
            pointer_inside: false,
            pending_saves: HashMap::new(),
            pending_deletes: HashMap::new(),
            failed_deletes: HashSet::new(),
            effects: Vec::new(),
        }
    }

    /// Builder: set the container the surface is laid out in.
    pub fn with_container(mut self, container: Rectangle) -> Self {
        self.set_container(container);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tool(&self) -> AnnotationTool {
        self.tool
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Mutable store access for hosts that clear the dirty flag after rendering.
    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    pub fn draw_state(&self) -> &DrawState {
        self.draw.state()
    }

    pub fn is_drawing(&self) -> bool {
        self.draw.is_drawing_box()
    }

    /// The box being dragged (signed extent), for preview rendering.
    pub fn pending_box(&self) -> Option<RawBox> {
        self.draw.pending_box()
    }

    /// Vertices of the polygon being built.
    pub fn polygon_buffer(&self) -> &[Point] {
        self.draw.polygon_buffer()
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn is_pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    pub fn current_label(&self) -> &str {
        &self.current_label
    }

    /// Drain queued effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ------------------------------------------------------------------
    // Surface geometry
    // ------------------------------------------------------------------

    /// Set the container rectangle (client space) the surface is laid out in.
    pub fn set_container(&mut self, container: Rectangle) {
        self.container = container;
        self.refresh_surface_bounds();
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
        self.refresh_surface_bounds();
    }

    pub fn reset_view(&mut self) {
        self.set_view(ViewTransform::identity());
        log::debug!("View reset");
    }

    fn refresh_surface_bounds(&mut self) {
        self.mapper
            .set_bounds(self.view.surface_bounds(self.container));
    }

    fn normalize(&self, client: Point) -> Option<Point> {
        match self.mapper.to_normalized(client) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("Ignoring pointer at ({:.1}, {:.1}): {}", client.x, client.y, e);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Tool and label selection
    // ------------------------------------------------------------------

    /// Switch the active tool.
    ///
    /// Refused while a box is being dragged. Leaving the Polygon tool cancels
    /// the vertex buffer; an active move drag is finished first. Selection is
    /// kept across switches.
    pub fn set_tool(&mut self, tool: AnnotationTool) -> Result<(), AnnotationError> {
        if tool == self.tool {
            return Ok(());
        }
        if self.draw.is_drawing_box() {
            log::warn!("Tool switch to {:?} refused while drawing a box", tool);
            self.effects
                .push(Effect::Warn(Warning::ToolSwitchRejected { requested: tool }));
            return Err(AnnotationError::ToolSwitchWhileDrawing { requested: tool });
        }
        let discarded = self.draw.cancel_polygon();
        if discarded > 0 {
            log::info!("Polygon with {} vertices cancelled by tool switch", discarded);
        }
        self.finish_move_drag();
        log::debug!("Tool: {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
        Ok(())
    }

    /// Label given to shapes committed from now on.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.current_label = label.into();
    }

    /// Color given to boxes committed from now on.
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.current_color = color.into();
    }

    // ------------------------------------------------------------------
    // Event routing
    // ------------------------------------------------------------------

    /// Route an input event according to the active tool.
    pub fn handle_event(&mut self, event: &InputEvent) {
        log::trace!("Event {} with tool={:?}", event.name(), self.tool);
        match *event {
            InputEvent::PointerDown {
                position,
                button: MouseButton::Middle,
            } => self.pan.start(position),
            InputEvent::PointerDown {
                position,
                button: MouseButton::Left,
            } => self.on_pointer_down(position),
            InputEvent::PointerDown { .. } => {}
            InputEvent::PointerMove { position } => self.on_pointer_move(position),
            InputEvent::PointerUp {
                button: MouseButton::Middle,
                ..
            } => self.pan.end(),
            InputEvent::PointerUp {
                position,
                button: MouseButton::Left,
            } => self.on_pointer_release(position),
            InputEvent::PointerUp { .. } => {}
            InputEvent::PointerEnter { .. } => self.pointer_inside = true,
            InputEvent::PointerLeave { position } => {
                self.pointer_inside = false;
                self.pan.end();
                self.on_pointer_release(position);
            }
            InputEvent::Click { position, detail } => self.on_click(position, detail),
            InputEvent::ContextMenu { .. } => self.on_context_menu(),
            InputEvent::Wheel { position, delta } => self.on_wheel(position, delta),
            InputEvent::KeyDown { key, modifiers } => self.handle_key(key, modifiers),
        }
    }

    /// Handle a key press from the global scope.
    pub fn handle_key(&mut self, key: Key, _modifiers: Modifiers) {
        if key != Key::Escape || !self.draw.is_building_polygon() {
            return;
        }
        let discarded = self.draw.cancel_polygon();
        log::info!("Polygon cancelled ({} vertices discarded)", discarded);
    }

    fn on_pointer_down(&mut self, position: Point) {
        match self.tool {
            AnnotationTool::Draw => {
                let Some(p) = self.normalize(position) else {
                    return;
                };
                self.draw.begin_box(p);
                log::debug!("Box: started at ({:.4}, {:.4})", p.x, p.y);
            }
            AnnotationTool::Move => {
                let Some(p) = self.normalize(position) else {
                    return;
                };
                self.begin_move_drag(p);
            }
            AnnotationTool::Polygon => {}
        }
    }

    fn on_pointer_move(&mut self, position: Point) {
        if let Some((dx, dy)) = self.pan.update(position) {
            self.set_view(self.view.pan_by(dx, dy));
            return;
        }
        match self.tool {
            AnnotationTool::Draw if self.draw.is_drawing_box() => {
                if let Some(p) = self.normalize(position) {
                    self.draw.update_box(p);
                }
            }
            AnnotationTool::Move if self.move_drag.is_some() => {
                if let Some(p) = self.normalize(position) {
                    self.update_move_drag(p);
                }
            }
            _ => {}
        }
    }

    /// Pointer-up and pointer-leave share this path so a drag that exits the
    /// surface is evaluated exactly like a release.
    fn on_pointer_release(&mut self, position: Point) {
        match self.tool {
            AnnotationTool::Draw if self.draw.is_drawing_box() => {
                if let Some(p) = self.normalize(position) {
                    self.draw.update_box(p);
                }
                match self.draw.end_box(self.config.min_drag_distance) {
                    Some(geometry) => {
                        let label = self.current_label.clone();
                        self.commit_box(geometry, label);
                    }
                    None => log::debug!("Box: released below drag threshold, discarded"),
                }
            }
            AnnotationTool::Move => self.finish_move_drag(),
            _ => {}
        }
    }

    fn on_click(&mut self, position: Point, detail: u32) {
        if self.tool != AnnotationTool::Polygon {
            return;
        }
        if detail >= 2 && self.draw.polygon_buffer().len() >= self.config.double_click_min_points {
            self.finalize_polygon_on_double_click();
            return;
        }
        let Some(p) = self.normalize(position) else {
            return;
        };
        let count = self.draw.add_polygon_point(p);
        log::debug!("Polygon: vertex {} at ({:.4}, {:.4})", count, p.x, p.y);
    }

    fn finalize_polygon_on_double_click(&mut self) {
        match self.draw.finalize_polygon(self.config.min_polygon_points) {
            Ok(points) => {
                self.commit_polygon(points);
            }
            Err(PolygonRejection::TooFewPoints { needed, got }) => {
                self.draw.cancel_polygon();
                log::warn!("Polygon discarded on double-click: {} of {} vertices", got, needed);
                self.effects
                    .push(Effect::Warn(Warning::PolygonDiscarded { needed, got }));
            }
            Err(PolygonRejection::NotBuilding) => {}
        }
    }

    fn on_context_menu(&mut self) {
        if self.tool != AnnotationTool::Polygon {
            return;
        }
        match self.draw.finalize_polygon(self.config.min_polygon_points) {
            Ok(points) => {
                self.commit_polygon(points);
            }
            Err(PolygonRejection::TooFewPoints { needed, got }) => {
                log::warn!("Polygon finalize rejected: {} of {} vertices", got, needed);
                self.effects
                    .push(Effect::Warn(Warning::PolygonTooSmall { needed, got }));
            }
            Err(PolygonRejection::NotBuilding) => {}
        }
    }

    fn on_wheel(&mut self, position: Point, delta: f32) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        let limits = self.config.zoom;
        let factor = limits.step.powf(delta);
        let view = self.view.zoom_by(factor, position, self.container, &limits);
        if view != self.view {
            log::debug!("Zoom: {:.2}x at ({:.1}, {:.1})", view.zoom, position.x, position.y);
            self.set_view(view);
        }
    }

    // ------------------------------------------------------------------
    // Move tool
    // ------------------------------------------------------------------

    fn begin_move_drag(&mut self, p: Point) {
        let Some(id) = self.store.hit_test(p) else {
            self.store.deselect_all();
            log::debug!("Move: no shape at ({:.4}, {:.4}), deselected", p.x, p.y);
            return;
        };
        let Some(original) = self.store.record(&id) else {
            return;
        };
        if let Err(e) = self.store.select(&id) {
            log::warn!("Move: could not select {}: {}", id, e);
            return;
        }
        log::debug!("Move: grabbed {}", id);
        self.move_drag = Some(MoveDrag {
            id,
            last: p,
            original,
            moved: false,
        });
    }

    fn update_move_drag(&mut self, p: Point) {
        let Some(drag) = self.move_drag.as_mut() else {
            return;
        };
        let (mut dx, mut dy) = (p.x - drag.last.x, p.y - drag.last.y);
        drag.last = p;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let id = drag.id.clone();
        if self.config.clamp == ClampPolicy::Clamp {
            if let Some(bounds) = self.shape_bounds(&id) {
                dx = clamp_axis(dx, -bounds.x, 1.0 - (bounds.x + bounds.width));
                dy = clamp_axis(dy, -bounds.y, 1.0 - (bounds.y + bounds.height));
            }
        }
        match self.store.move_shape(&id, dx, dy) {
            Ok(()) => {
                if let Some(drag) = self.move_drag.as_mut() {
                    drag.moved = true;
                }
            }
            Err(e) => {
                log::warn!("Move: {}", e);
                self.move_drag = None;
            }
        }
    }

    fn finish_move_drag(&mut self) {
        let Some(drag) = self.move_drag.take() else {
            return;
        };
        if !drag.moved {
            return;
        }
        if let Some(record) = self.store.record(&drag.id) {
            log::info!("Moved {} {}", record.kind().name(), drag.id);
            self.emit_save(record, Baseline::Confirmed(drag.original));
        }
    }

    fn shape_bounds(&self, id: &ShapeId) -> Option<BoxGeometry> {
        self.store
            .get_box(id)
            .map(BoxAnnotation::geometry)
            .or_else(|| self.store.get_polygon(id).and_then(PolygonAnnotation::bounding_box))
    }

    // ------------------------------------------------------------------
    // Commits and programmatic edits
    // ------------------------------------------------------------------

    fn commit_box(&mut self, geometry: BoxGeometry, label: String) -> ShapeId {
        let id = self.ids.next_id(ShapeKind::Box);
        let annotation =
            BoxAnnotation::new(id.clone(), geometry, label, self.current_color.clone());
        self.store.add_box(annotation.clone());
        if let Err(e) = self.store.select(&id) {
            log::warn!("Could not select new box {}: {}", id, e);
        }
        log::info!(
            "Created box {} at ({:.4}, {:.4}) size {:.4}x{:.4} (total: {})",
            id,
            geometry.x,
            geometry.y,
            geometry.width,
            geometry.height,
            self.store.boxes().len()
        );
        self.emit_save(ShapeRecord::Box(annotation), Baseline::Created);
        id
    }

    fn commit_polygon(&mut self, points: Vec<Point>) -> ShapeId {
        let id = self.ids.next_id(ShapeKind::Polygon);
        let annotation = PolygonAnnotation::new(id.clone(), points, self.current_label.clone());
        log::info!(
            "Created polygon {} with {} vertices (total: {})",
            id,
            annotation.points.len(),
            self.store.polygons().len() + 1
        );
        self.store.add_polygon(annotation.clone());
        if let Err(e) = self.store.select(&id) {
            log::warn!("Could not select new polygon {}: {}", id, e);
        }
        self.emit_save(ShapeRecord::Polygon(annotation), Baseline::Created);
        id
    }

    fn emit_save(&mut self, record: ShapeRecord, baseline: Baseline) {
        let id = record.id().clone();
        // Keep the oldest baseline while several saves are in flight.
        self.pending_saves
            .entry(id.clone())
            .or_insert_with(|| PendingSaves {
                baseline,
                in_flight: VecDeque::new(),
            })
            .in_flight
            .push_back(record.clone());
        self.failed_deletes.remove(&id);
        self.store.set_sync_state(&id, SyncState::Pending);
        self.effects.push(Effect::Save(record));
    }

    /// Replace the store contents with shapes loaded for a new image.
    ///
    /// Any in-progress drawing and unresolved writes are dropped. Boxes are
    /// normalized and degenerate polygons are skipped.
    pub fn load(&mut self, annotations: ImageAnnotations) {
        self.draw.reset();
        self.move_drag = None;
        self.pending_saves.clear();
        self.pending_deletes.clear();
        self.failed_deletes.clear();
        self.store.load(
            annotations.boxes,
            annotations.polygons,
            self.config.min_polygon_points,
        );
    }

    /// Commit a box without a drag, using the current label.
    pub fn add_box(&mut self, geometry: BoxGeometry) -> Result<ShapeId, AnnotationError> {
        let label = self.current_label.clone();
        self.add_labeled_box(geometry, label)
    }

    fn add_labeled_box(
        &mut self,
        geometry: BoxGeometry,
        label: String,
    ) -> Result<ShapeId, AnnotationError> {
        if ![geometry.x, geometry.y, geometry.width, geometry.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(AnnotationError::invalid_geometry("non-finite box geometry"));
        }
        let geometry =
            BoxGeometry::from_drag(geometry.x, geometry.y, geometry.width, geometry.height);
        Ok(self.commit_box(geometry, label))
    }

    /// Commit an accepted AI suggestion as a box.
    ///
    /// `label` falls back to the current label. The suggestion's own status is
    /// owned by the caller and is not touched here.
    pub fn accept_suggestion(
        &mut self,
        suggestion: &Suggestion,
        label: Option<&str>,
    ) -> Result<ShapeId, AnnotationError> {
        log::info!(
            "Accepting suggestion {} (confidence {:.2})",
            suggestion.id,
            suggestion.confidence
        );
        let label = label.map_or_else(|| self.current_label.clone(), str::to_string);
        self.add_labeled_box(suggestion.bbox, label)
    }

    /// Apply a partial update to a box.
    pub fn update_box(&mut self, id: &ShapeId, patch: &BoxPatch) -> Result<(), AnnotationError> {
        let previous = self
            .store
            .record(id)
            .ok_or_else(|| AnnotationError::UnknownShape(id.clone()))?;
        let updated = self.store.update_box(id, patch)?.clone();
        log::debug!("Updated box {}", id);
        self.emit_save(ShapeRecord::Box(updated), Baseline::Confirmed(previous));
        Ok(())
    }

    /// Delete a shape locally and request the remote delete.
    pub fn delete(&mut self, id: &ShapeId) -> Result<(), AnnotationError> {
        if self.move_drag.as_ref().is_some_and(|d| &d.id == id) {
            self.move_drag = None;
        }
        let (index, record) = self
            .store
            .remove(id)
            .ok_or_else(|| AnnotationError::UnknownShape(id.clone()))?;
        self.store.forget_sync_state(id);
        self.pending_saves.remove(id);
        self.pending_deletes
            .insert(id.clone(), PendingDelete { index, record });
        log::info!("Deleted {}", id);
        self.effects.push(Effect::Delete(id.clone()));
        Ok(())
    }

    pub fn select(&mut self, id: &ShapeId) -> Result<ShapeKind, AnnotationError> {
        self.store.select(id)
    }

    pub fn deselect_all(&mut self) {
        self.store.deselect_all();
    }

    /// Discard the polygon buffer. Returns how many vertices were dropped.
    pub fn cancel_polygon(&mut self) -> usize {
        self.draw.cancel_polygon()
    }

    // ------------------------------------------------------------------
    // Persistence results
    // ------------------------------------------------------------------

    /// Report the outcome of a [`Effect::Save`].
    ///
    /// Results are expected in the order the saves were issued.
    pub fn resolve_save(&mut self, id: &ShapeId, result: Result<(), PersistError>) {
        let confirmed = self
            .pending_saves
            .get_mut(id)
            .and_then(|pending| pending.in_flight.pop_front());
        let error = match result {
            Ok(()) => {
                let settled = match self.pending_saves.get_mut(id) {
                    Some(pending) if !pending.in_flight.is_empty() => {
                        // Later saves revert to this one if they fail.
                        if let Some(record) = confirmed {
                            pending.baseline = Baseline::Confirmed(record);
                        }
                        false
                    }
                    _ => true,
                };
                if settled {
                    self.pending_saves.remove(id);
                    if self.store.kind_of(id).is_some() {
                        self.store.set_sync_state(id, SyncState::Saved);
                    }
                }
                log::debug!("Saved {}", id);
                return;
            }
            Err(e) => e,
        };

        log::warn!("Save of {} failed: {}", id, error);
        self.effects.push(Effect::Warn(Warning::SaveFailed {
            id: id.clone(),
            reason: error.to_string(),
        }));
        if self.store.kind_of(id).is_none() {
            // Deleted locally while the save was in flight.
            self.pending_saves.remove(id);
            return;
        }

        let baseline = match self.config.failure_policy {
            FailurePolicy::Revert => self.pending_saves.remove(id).map(|p| p.baseline),
            FailurePolicy::FlagUnsaved => {
                if self
                    .pending_saves
                    .get(id)
                    .is_some_and(|p| p.in_flight.is_empty())
                {
                    self.pending_saves.remove(id);
                }
                None
            }
        };
        let reverted = match baseline {
            Some(Baseline::Created) => {
                self.store.remove(id);
                self.store.forget_sync_state(id);
                true
            }
            Some(Baseline::Confirmed(ShapeRecord::Box(previous))) => {
                self.store.replace_box(previous).is_ok()
            }
            Some(Baseline::Confirmed(ShapeRecord::Polygon(previous))) => {
                self.store.replace_polygon(previous).is_ok()
            }
            None => false,
        };
        if reverted {
            if self.store.kind_of(id).is_some() {
                self.store.set_sync_state(id, SyncState::Saved);
            }
            self.effects.push(Effect::Reverted(id.clone()));
        } else {
            self.store
                .set_sync_state(id, SyncState::Failed(error.to_string()));
        }
    }

    /// Report the outcome of a [`Effect::Delete`].
    pub fn resolve_delete(&mut self, id: &ShapeId, result: Result<(), PersistError>) {
        let pending = self.pending_deletes.remove(id);
        let error = match result {
            Ok(()) => {
                self.failed_deletes.remove(id);
                log::debug!("Delete of {} confirmed", id);
                return;
            }
            Err(e) => e,
        };

        log::warn!("Delete of {} failed: {}", id, error);
        self.effects.push(Effect::Warn(Warning::DeleteFailed {
            id: id.clone(),
            reason: error.to_string(),
        }));
        match (self.config.failure_policy, pending) {
            (FailurePolicy::Revert, Some(PendingDelete { index, record })) => {
                self.store.restore(index, record);
                self.effects.push(Effect::Reverted(id.clone()));
            }
            _ => {
                self.failed_deletes.insert(id.clone());
            }
        }
    }

    /// Shapes whose last save or delete failed and was kept locally.
    pub fn unsaved(&self) -> Vec<ShapeId> {
        let mut ids = self.store.failed();
        let mut deletes: Vec<ShapeId> = self.failed_deletes.iter().cloned().collect();
        deletes.sort();
        ids.extend(deletes);
        ids
    }

    /// Re-emit writes for everything in [`Session::unsaved`]. Returns how many.
    pub fn retry_unsaved(&mut self) -> usize {
        let failed = self.store.failed();
        let mut count = 0;
        for id in failed {
            if let Some(record) = self.store.record(&id) {
                self.store.set_sync_state(&id, SyncState::Pending);
                self.effects.push(Effect::Save(record));
                count += 1;
            }
        }
        let mut deletes: Vec<ShapeId> = self.failed_deletes.drain().collect();
        deletes.sort();
        for id in deletes {
            self.effects.push(Effect::Delete(id));
            count += 1;
        }
        if count > 0 {
            log::info!("Retrying {} unsaved writes", count);
        }
        count
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("tool", &self.tool)
            .field("draw", self.draw.state())
            .field("shapes", &self.store.len())
            .field("view", &self.view)
            .field("pending_effects", &self.effects.len())
            .finish()
    }
}

/// Clamp a delta to `[lo, hi]`; leaves it alone when the range is empty
/// (shape larger than the surface or already outside it).
fn clamp_axis(delta: f32, lo: f32, hi: f32) -> f32 {
    if lo <= hi { delta.clamp(lo, hi) } else { delta }
}
