//! In-memory annotation store for a single image.
//!
//! Boxes and polygons are kept in insertion order so iteration matches render
//! order. At most one box and at most one polygon are selected at a time.
//! Ids are produced by the caller; the store does not enforce uniqueness.

use std::collections::HashMap;

use crate::error::AnnotationError;
use crate::model::{BoxAnnotation, BoxGeometry, BoxPatch, Point, PolygonAnnotation, ShapeId, ShapeKind};
use crate::persist::{ShapeRecord, SyncState};

/// Storage for the committed shapes on one image.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    boxes: Vec<BoxAnnotation>,
    polygons: Vec<PolygonAnnotation>,
    selected_box: Option<ShapeId>,
    selected_polygon: Option<ShapeId>,
    /// Persistence state per shape. Missing entries count as saved.
    sync: HashMap<ShapeId, SyncState>,
    /// Set on every mutation; hosts clear it after re-rendering.
    dirty: bool,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with shapes loaded from persistence.
    ///
    /// Boxes are re-normalized to a non-negative extent. Shapes with
    /// non-finite coordinates and polygons with fewer than
    /// `min_polygon_points` vertices are dropped.
    pub fn load(
        &mut self,
        boxes: Vec<BoxAnnotation>,
        polygons: Vec<PolygonAnnotation>,
        min_polygon_points: usize,
    ) {
        self.boxes = boxes
            .into_iter()
            .filter_map(|mut b| {
                let g = b.geometry();
                if ![g.x, g.y, g.width, g.height].iter().all(|v| v.is_finite()) {
                    log::warn!("Dropping loaded box {}: non-finite geometry", b.id);
                    return None;
                }
                b.set_geometry(BoxGeometry::from_drag(g.x, g.y, g.width, g.height));
                Some(b)
            })
            .collect();
        self.polygons = polygons
            .into_iter()
            .filter(|p| {
                if p.points.len() < min_polygon_points {
                    log::warn!(
                        "Dropping loaded polygon {}: {} of {} vertices",
                        p.id,
                        p.points.len(),
                        min_polygon_points
                    );
                    return false;
                }
                if !p.points.iter().all(|v| v.x.is_finite() && v.y.is_finite()) {
                    log::warn!("Dropping loaded polygon {}: non-finite vertex", p.id);
                    return false;
                }
                true
            })
            .collect();
        self.selected_box = None;
        self.selected_polygon = None;
        self.sync.clear();
        self.dirty = true;
        log::info!(
            "Loaded {} boxes and {} polygons",
            self.boxes.len(),
            self.polygons.len()
        );
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    pub fn add_box(&mut self, annotation: BoxAnnotation) {
        self.boxes.push(annotation);
        self.dirty = true;
    }

    pub fn add_polygon(&mut self, annotation: PolygonAnnotation) {
        self.polygons.push(annotation);
        self.dirty = true;
    }

    /// Re-insert a shape at the position it was removed from (used when a
    /// failed delete is rolled back). Out-of-range indices append.
    pub fn restore(&mut self, index: usize, record: ShapeRecord) {
        match record {
            ShapeRecord::Box(b) => {
                let index = index.min(self.boxes.len());
                self.boxes.insert(index, b);
            }
            ShapeRecord::Polygon(p) => {
                let index = index.min(self.polygons.len());
                self.polygons.insert(index, p);
            }
        }
        self.dirty = true;
    }

    /// Apply a partial update to a box.
    pub fn update_box(&mut self, id: &ShapeId, patch: &BoxPatch) -> Result<&BoxAnnotation, AnnotationError> {
        if self.get_polygon(id).is_some() {
            return Err(AnnotationError::NotABox(id.clone()));
        }
        let annotation = self
            .boxes
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| AnnotationError::UnknownShape(id.clone()))?;
        annotation.apply(patch)?;
        self.dirty = true;
        Ok(annotation)
    }

    /// Replace a box wholesale (used when reverting an update).
    pub fn replace_box(&mut self, annotation: BoxAnnotation) -> Result<(), AnnotationError> {
        let slot = self
            .boxes
            .iter_mut()
            .find(|b| b.id == annotation.id)
            .ok_or_else(|| AnnotationError::UnknownShape(annotation.id.clone()))?;
        *slot = annotation;
        self.dirty = true;
        Ok(())
    }

    /// Replace a polygon wholesale, keeping its position.
    pub fn replace_polygon(&mut self, annotation: PolygonAnnotation) -> Result<(), AnnotationError> {
        let slot = self
            .polygons
            .iter_mut()
            .find(|p| p.id == annotation.id)
            .ok_or_else(|| AnnotationError::UnknownShape(annotation.id.clone()))?;
        *slot = annotation;
        self.dirty = true;
        Ok(())
    }

    /// Translate a box or polygon by a normalized delta.
    ///
    /// Width and height of boxes are never changed by a move.
    pub fn move_shape(&mut self, id: &ShapeId, dx: f32, dy: f32) -> Result<(), AnnotationError> {
        if let Some(b) = self.boxes.iter_mut().find(|b| &b.id == id) {
            b.x += dx;
            b.y += dy;
        } else if let Some(p) = self.polygons.iter_mut().find(|p| &p.id == id) {
            p.translate(dx, dy);
        } else {
            return Err(AnnotationError::UnknownShape(id.clone()));
        }
        self.dirty = true;
        Ok(())
    }

    /// Remove a shape by id, clearing its selection.
    ///
    /// Returns the shape and its index within its kind's list.
    pub fn remove(&mut self, id: &ShapeId) -> Option<(usize, ShapeRecord)> {
        let removed = if let Some(idx) = self.boxes.iter().position(|b| &b.id == id) {
            Some((idx, ShapeRecord::Box(self.boxes.remove(idx))))
        } else if let Some(idx) = self.polygons.iter().position(|p| &p.id == id) {
            Some((idx, ShapeRecord::Polygon(self.polygons.remove(idx))))
        } else {
            None
        };
        if removed.is_some() {
            if self.selected_box.as_ref() == Some(id) {
                self.selected_box = None;
            }
            if self.selected_polygon.as_ref() == Some(id) {
                self.selected_polygon = None;
            }
            self.dirty = true;
        }
        removed
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select a shape. Boxes and polygons have independent selection slots.
    pub fn select(&mut self, id: &ShapeId) -> Result<ShapeKind, AnnotationError> {
        let kind = self
            .kind_of(id)
            .ok_or_else(|| AnnotationError::UnknownShape(id.clone()))?;
        let slot = match kind {
            ShapeKind::Box => &mut self.selected_box,
            ShapeKind::Polygon => &mut self.selected_polygon,
        };
        if slot.as_ref() != Some(id) {
            *slot = Some(id.clone());
            self.dirty = true;
        }
        Ok(kind)
    }

    pub fn deselect_all(&mut self) {
        if self.selected_box.is_some() || self.selected_polygon.is_some() {
            self.selected_box = None;
            self.selected_polygon = None;
            self.dirty = true;
        }
    }

    pub fn selected_box(&self) -> Option<&ShapeId> {
        self.selected_box.as_ref()
    }

    pub fn selected_polygon(&self) -> Option<&ShapeId> {
        self.selected_polygon.as_ref()
    }

    pub fn is_selected(&self, id: &ShapeId) -> bool {
        self.selected_box.as_ref() == Some(id) || self.selected_polygon.as_ref() == Some(id)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn boxes(&self) -> &[BoxAnnotation] {
        &self.boxes
    }

    pub fn polygons(&self) -> &[PolygonAnnotation] {
        &self.polygons
    }

    pub fn get_box(&self, id: &ShapeId) -> Option<&BoxAnnotation> {
        self.boxes.iter().find(|b| &b.id == id)
    }

    pub fn get_polygon(&self, id: &ShapeId) -> Option<&PolygonAnnotation> {
        self.polygons.iter().find(|p| &p.id == id)
    }

    /// Snapshot of a shape in its wire form.
    pub fn record(&self, id: &ShapeId) -> Option<ShapeRecord> {
        self.get_box(id)
            .cloned()
            .map(ShapeRecord::Box)
            .or_else(|| self.get_polygon(id).cloned().map(ShapeRecord::Polygon))
    }

    pub fn kind_of(&self, id: &ShapeId) -> Option<ShapeKind> {
        if self.get_box(id).is_some() {
            Some(ShapeKind::Box)
        } else if self.get_polygon(id).is_some() {
            Some(ShapeKind::Polygon)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len() + self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topmost shape under a normalized point.
    ///
    /// Polygons render above boxes and later shapes above earlier ones, so
    /// polygons are tested newest-first, then boxes newest-first.
    pub fn hit_test(&self, point: Point) -> Option<ShapeId> {
        self.polygons
            .iter()
            .rev()
            .find(|p| p.contains(point))
            .map(|p| p.id.clone())
            .or_else(|| {
                self.boxes
                    .iter()
                    .rev()
                    .find(|b| b.contains(point))
                    .map(|b| b.id.clone())
            })
    }

    // ------------------------------------------------------------------
    // Persistence state
    // ------------------------------------------------------------------

    pub fn sync_state(&self, id: &ShapeId) -> SyncState {
        self.sync.get(id).cloned().unwrap_or(SyncState::Saved)
    }

    pub fn set_sync_state(&mut self, id: &ShapeId, state: SyncState) {
        if state == SyncState::Saved {
            self.sync.remove(id);
        } else {
            self.sync.insert(id.clone(), state);
        }
    }

    pub fn forget_sync_state(&mut self, id: &ShapeId) {
        self.sync.remove(id);
    }

    /// Shapes whose last write failed, in render order.
    pub fn failed(&self) -> Vec<ShapeId> {
        self.boxes
            .iter()
            .map(|b| &b.id)
            .chain(self.polygons.iter().map(|p| &p.id))
            .filter(|id| matches!(self.sync.get(*id), Some(SyncState::Failed(_))))
            .cloned()
            .collect()
    }
}
