//! Crop frame bookkeeping.

use crate::canvas::Canvas;
use crate::config::FrameDefaults;
use crate::error::{EditorError, EditorResult};
use crate::events::{EventBus, Subscription, Topic};
use crate::factory;
use crate::shapes::{ObjectId, frame_name, parse_frame_name};

/// Summary of a frame for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub id: ObjectId,
    pub name: String,
    pub number: u32,
}

/// Creates frames and keeps their stroke normalization attached.
pub struct FrameManager {
    defaults: FrameDefaults,
    /// One scaling/modified subscription per frame.
    behaviors: Vec<(ObjectId, Subscription)>,
}

impl FrameManager {
    pub fn new(defaults: FrameDefaults) -> Self {
        Self {
            defaults,
            behaviors: Vec::new(),
        }
    }

    /// Number for the next frame: frame count + 1, bumped past any name in use.
    pub fn next_frame_number(canvas: &Canvas) -> u32 {
        let mut number = canvas.frames().count() as u32 + 1;
        while canvas.frame_by_name(&frame_name(number)).is_some() {
            number += 1;
        }
        number
    }

    /// Insert a new frame and attach its normalization behavior.
    pub fn add_frame(&mut self, canvas: &mut Canvas, bus: &EventBus) -> ObjectId {
        let number = Self::next_frame_number(canvas);
        let frame = factory::frame(number, &self.defaults);
        let id = canvas.add(frame.into());

        let subscription = bus.subscribe_object(
            id,
            &[Topic::ObjectScaling, Topic::ObjectModified],
            Box::new(move |canvas, _| {
                if let Some(frame) = canvas.get_mut(id).and_then(|s| s.as_frame_mut()) {
                    frame.normalize_scale();
                }
            }),
        );
        self.behaviors.push((id, subscription));
        canvas.render();
        log::info!("Added {}", frame_name(number));
        id
    }

    /// Frames whose name matches `Frame <n>`, back to front.
    pub fn list_frames(canvas: &Canvas) -> Vec<FrameInfo> {
        canvas
            .frames()
            .filter_map(|f| {
                parse_frame_name(f.name()).map(|number| FrameInfo {
                    id: f.id,
                    name: f.name().to_string(),
                    number,
                })
            })
            .collect()
    }

    /// Make the named frame active.
    pub fn select_frame(canvas: &mut Canvas, name: &str) -> EditorResult<ObjectId> {
        let id = canvas
            .frame_by_name(name)
            .map(|f| f.id)
            .ok_or_else(|| EditorError::UnknownFrame(name.to_string()))?;
        canvas.set_active(id)?;
        canvas.render();
        Ok(id)
    }

    /// Drop behaviors of frames no longer on the canvas.
    pub fn prune(&mut self, canvas: &Canvas) {
        self.behaviors.retain(|(id, _)| canvas.contains(*id));
    }

    /// Number of frames with an attached behavior.
    pub fn tracked(&self) -> usize {
        self.behaviors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CanvasEvent;
    use crate::factory;
    use crate::shapes::{CssColor, Shape};

    fn setup() -> (Canvas, EventBus, FrameManager) {
        (
            Canvas::new(500, 500, CssColor::new("#ffffff")),
            EventBus::new(),
            FrameManager::new(FrameDefaults::default()),
        )
    }

    fn pump(canvas: &mut Canvas, bus: &EventBus) {
        for event in canvas.take_events() {
            bus.emit(canvas, &event);
        }
    }

    #[test]
    fn test_sequential_names() {
        let (mut canvas, bus, mut frames) = setup();
        canvas.add(factory::default_rectangle().into());
        frames.add_frame(&mut canvas, &bus);
        frames.add_frame(&mut canvas, &bus);
        let names: Vec<_> = FrameManager::list_frames(&canvas)
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Frame 1", "Frame 2"]);
    }

    #[test]
    fn test_name_skips_used_numbers() {
        let (mut canvas, bus, mut frames) = setup();
        let first = frames.add_frame(&mut canvas, &bus);
        frames.add_frame(&mut canvas, &bus);
        canvas.remove(first);
        frames.prune(&canvas);
        assert_eq!(frames.tracked(), 1);
        // One frame left ("Frame 2"), so count + 1 = 2 is taken.
        assert_eq!(FrameManager::next_frame_number(&canvas), 3);
    }

    #[test]
    fn test_scaling_normalizes_stroke() {
        let (mut canvas, bus, mut frames) = setup();
        let id = frames.add_frame(&mut canvas, &bus);
        pump(&mut canvas, &bus);

        for _ in 0..3 {
            if let Some(Shape::Frame(f)) = canvas.get_mut(id) {
                f.props.scale_x = 1.5;
                f.props.scale_y = 0.5;
                f.props.stroke_width = 4.0;
            }
            canvas.notify(CanvasEvent::ObjectScaling(id));
            pump(&mut canvas, &bus);
        }
        canvas.notify(CanvasEvent::ObjectModified(id));
        pump(&mut canvas, &bus);

        let frame = canvas.get(id).and_then(|s| s.as_frame()).unwrap();
        assert!((frame.props.stroke_width - 1.0).abs() < f64::EPSILON);
        assert!((frame.props.scale_x - 1.0).abs() < f64::EPSILON);
        assert!((frame.width - 200.0 * 1.5 * 1.5 * 1.5).abs() < 1e-9);
        assert!((frame.height - 200.0 * 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_behavior_ignores_other_objects() {
        let (mut canvas, bus, mut frames) = setup();
        frames.add_frame(&mut canvas, &bus);
        let mut rect = factory::default_rectangle();
        rect.props.scale_x = 2.0;
        let rect_id = canvas.add(rect.into());
        canvas.notify(CanvasEvent::ObjectScaling(rect_id));
        pump(&mut canvas, &bus);
        assert!((canvas.get(rect_id).unwrap().props().scale_x - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_select_frame() {
        let (mut canvas, bus, mut frames) = setup();
        let id = frames.add_frame(&mut canvas, &bus);
        assert_eq!(FrameManager::select_frame(&mut canvas, "Frame 1").unwrap(), id);
        assert_eq!(canvas.active(), Some(id));
        assert!(matches!(
            FrameManager::select_frame(&mut canvas, "Frame 9"),
            Err(EditorError::UnknownFrame(_))
        ));
    }
}
