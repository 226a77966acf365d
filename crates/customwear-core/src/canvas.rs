//! Scene graph: the ordered set of objects on the editor surface.

use crate::error::{EditorError, EditorResult};
use crate::events::CanvasEvent;
use crate::shapes::{CssColor, Frame, GuidelineKind, ObjectId, Shape};
use kurbo::{Point, Size};
use std::collections::HashMap;

/// The editing surface.
///
/// Owns every object of a session in back-to-front order together with the
/// render target's size and background. Mutations queue [`CanvasEvent`]s
/// which the owner drains with [`Canvas::take_events`].
#[derive(Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    background: CssColor,
    objects: HashMap<ObjectId, Shape>,
    /// Z-order of objects (back to front).
    z_order: Vec<ObjectId>,
    active: Option<ObjectId>,
    pending: Vec<CanvasEvent>,
    /// Number of completed renders.
    generation: u64,
    dirty: bool,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: CssColor) -> Self {
        Self {
            width,
            height,
            background,
            objects: HashMap::new(),
            z_order: Vec::new(),
            active: None,
            pending: Vec::new(),
            generation: 0,
            dirty: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    pub fn background(&self) -> &CssColor {
        &self.background
    }

    /// Resize the render target. Object coordinates are left untouched.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    /// Change the colour painted behind all objects.
    pub fn set_background_color(&mut self, color: CssColor) {
        self.background = color;
        self.dirty = true;
    }

    /// Append an object on top of the stack.
    pub fn add(&mut self, shape: Shape) -> ObjectId {
        let id = shape.id();
        log::debug!("Adding {} {}", shape.kind().name(), id);
        self.z_order.push(id);
        self.objects.insert(id, shape);
        self.pending.push(CanvasEvent::ObjectCreated(id));
        self.dirty = true;
        id
    }

    /// Remove an object. Removing the active object clears the selection.
    pub fn remove(&mut self, id: ObjectId) -> Option<Shape> {
        let shape = self.objects.remove(&id)?;
        self.z_order.retain(|&other| other != id);
        if self.active == Some(id) {
            self.active = None;
            self.pending.push(CanvasEvent::ObjectDeselected(Some(id)));
        }
        log::debug!("Removed {} {}", shape.kind().name(), id);
        self.dirty = true;
        Some(shape)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Shape> {
        self.objects.get(&id)
    }

    /// Mutable access. The canvas is marked for re-render.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Shape> {
        let shape = self.objects.get_mut(&id)?;
        self.dirty = true;
        Some(shape)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Objects back to front.
    pub fn objects(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All frames, back to front.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.objects().filter_map(Shape::as_frame)
    }

    pub fn frame_by_name(&self, name: &str) -> Option<&Frame> {
        self.frames().find(|f| f.name() == name)
    }

    /// Guideline objects currently on the canvas.
    pub fn guidelines(&self) -> Vec<(ObjectId, GuidelineKind)> {
        self.objects()
            .filter_map(|s| s.guideline().map(|kind| (s.id(), kind)))
            .collect()
    }

    pub fn has_guideline(&self, kind: GuidelineKind) -> bool {
        self.objects().any(|s| s.guideline() == Some(kind))
    }

    /// Remove every guideline. Returns how many were removed.
    pub fn clear_guidelines(&mut self) -> usize {
        let ids: Vec<ObjectId> = self.guidelines().into_iter().map(|(id, _)| id).collect();
        for id in &ids {
            self.objects.remove(id);
        }
        self.z_order.retain(|id| !ids.contains(id));
        if !ids.is_empty() {
            self.dirty = true;
        }
        ids.len()
    }

    /// Insert a guideline without announcing it as a created object.
    pub(crate) fn add_guideline(&mut self, shape: Shape) -> ObjectId {
        let id = shape.id();
        self.z_order.push(id);
        self.objects.insert(id, shape);
        self.dirty = true;
        id
    }

    /// Make `id` the active object.
    pub fn set_active(&mut self, id: ObjectId) -> EditorResult<()> {
        let shape = self.objects.get(&id).ok_or(EditorError::UnknownObject(id))?;
        if !shape.props().selectable {
            return Err(EditorError::Validation(format!(
                "{} {} is not selectable",
                shape.kind().name(),
                id
            )));
        }
        self.active = Some(id);
        self.pending.push(CanvasEvent::ObjectSelected(id));
        self.dirty = true;
        Ok(())
    }

    /// Clear the selection.
    pub fn discard_active(&mut self) {
        let previous = self.active.take();
        self.pending.push(CanvasEvent::ObjectDeselected(previous));
        if previous.is_some() {
            self.dirty = true;
        }
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Topmost evented, visible object under `point`.
    pub fn object_at(&self, point: Point, tolerance: f64) -> Option<ObjectId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.objects.get(id).is_some_and(|s| {
                let props = s.props();
                props.evented && props.visible && s.hit_test(point, tolerance)
            })
        })
    }

    /// Queue an event produced by an interaction (move, scale, modify).
    pub fn notify(&mut self, event: CanvasEvent) {
        self.pending.push(event);
    }

    /// Drain queued events in the order they occurred.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn needs_render(&self) -> bool {
        self.dirty
    }

    /// Mark the current state as rendered and return the new generation.
    pub fn render(&mut self) -> u64 {
        self.generation += 1;
        self.dirty = false;
        log::trace!("Render #{} ({} objects)", self.generation, self.objects.len());
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, Rectangle};

    fn canvas() -> Canvas {
        Canvas::new(500, 500, CssColor::new("#ffffff"))
    }

    #[test]
    fn test_add_queues_created() {
        let mut canvas = canvas();
        let id = canvas.add(Rectangle::new(50.0, 100.0, 100.0, 60.0, "blue").into());
        assert_eq!(canvas.len(), 1);
        assert_eq!(canvas.take_events(), vec![CanvasEvent::ObjectCreated(id)]);
        assert!(!canvas.has_pending_events());
    }

    #[test]
    fn test_remove_active_deselects() {
        let mut canvas = canvas();
        let id = canvas.add(Rectangle::new(0.0, 0.0, 10.0, 10.0, "blue").into());
        canvas.set_active(id).unwrap();
        canvas.take_events();

        assert!(canvas.remove(id).is_some());
        assert_eq!(canvas.active(), None);
        assert_eq!(canvas.take_events(), vec![CanvasEvent::ObjectDeselected(Some(id))]);
        assert!(canvas.remove(id).is_none());
    }

    #[test]
    fn test_set_active_unknown() {
        let mut canvas = canvas();
        let result = canvas.set_active(uuid::Uuid::new_v4());
        assert!(matches!(result, Err(EditorError::UnknownObject(_))));
    }

    #[test]
    fn test_guidelines_not_selectable() {
        let mut canvas = canvas();
        let id = canvas.add_guideline(Line::guideline(GuidelineKind::VerticalLeft, 0.0, 500.0).into());
        assert!(canvas.set_active(id).is_err());
        assert!(canvas.take_events().is_empty());
        assert_eq!(canvas.clear_guidelines(), 1);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_set_dimensions_keeps_positions() {
        let mut canvas = canvas();
        let id = canvas.add(Rectangle::new(50.0, 100.0, 100.0, 60.0, "blue").into());
        canvas.set_dimensions(800, 300);
        assert_eq!(canvas.width(), 800);
        let props = canvas.get(id).unwrap().props();
        assert!((props.left - 50.0).abs() < f64::EPSILON);
        assert!((props.top - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_clears_dirty() {
        let mut canvas = canvas();
        assert!(canvas.needs_render());
        assert_eq!(canvas.render(), 1);
        assert!(!canvas.needs_render());
        canvas.set_background_color(CssColor::new("#000000"));
        assert!(canvas.needs_render());
        assert_eq!(canvas.background().as_str(), "#000000");
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut canvas = canvas();
        let _bottom = canvas.add(Rectangle::new(0.0, 0.0, 100.0, 100.0, "blue").into());
        let top = canvas.add(Rectangle::new(50.0, 50.0, 100.0, 100.0, "red").into());
        assert_eq!(canvas.object_at(Point::new(75.0, 75.0), 0.0), Some(top));
        assert_eq!(canvas.object_at(Point::new(400.0, 400.0), 0.0), None);
    }
}
