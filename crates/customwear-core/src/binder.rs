//! Property panel bound to the active selection.

use crate::canvas::Canvas;
use crate::error::{EditorError, EditorResult};
use crate::events::{CanvasEvent, EventBus, Subscription, Topic};
use crate::settings::{parse_color, parse_dimension, parse_integer};
use crate::shapes::{FontFamily, FontWeight, ObjectId, Shape, ShapeKind};
use std::cell::RefCell;
use std::rc::Rc;

/// Editable fields derived from the active object.
///
/// Numeric fields hold the text shown in the inputs; fields that do not apply
/// to the selected variant are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPanel {
    pub target: Option<ObjectId>,
    pub kind: Option<ShapeKind>,
    pub width: String,
    pub height: String,
    pub diameter: String,
    pub fill: String,
    pub font_family: Option<FontFamily>,
    pub font_weight: Option<FontWeight>,
    pub font_size: String,
}

impl PropertyPanel {
    /// Project `shape` into panel fields.
    pub fn from_shape(shape: &Shape) -> Self {
        let mut panel = Self {
            target: Some(shape.id()),
            kind: Some(shape.kind()),
            ..Self::default()
        };
        let fill = || shape.props().fill.to_string();
        match shape {
            Shape::Rectangle(_) | Shape::Frame(_) => {
                let size = shape.effective_size();
                panel.width = format_length(size.width);
                panel.height = format_length(size.height);
                panel.fill = fill();
            }
            Shape::Circle(circle) => {
                panel.diameter = format_length(circle.diameter());
                panel.fill = fill();
            }
            Shape::Textbox(text) => {
                panel.font_family = Some(text.font_family);
                panel.font_weight = Some(text.font_weight);
                panel.font_size = text.font_size.to_string();
                panel.fill = fill();
            }
            Shape::Triangle(_) => panel.fill = fill(),
            Shape::Line(_) | Shape::Image(_) => {}
        }
        panel
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn format_length(value: f64) -> String {
    format!("{}", value.round() as i64)
}

/// A single edit from the property panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    Width(String),
    Height(String),
    Diameter(String),
    Fill(String),
    FontFamily(FontFamily),
    FontWeight(FontWeight),
    FontSize(String),
}

impl PropertyEdit {
    fn field(&self) -> &'static str {
        match self {
            PropertyEdit::Width(_) => "width",
            PropertyEdit::Height(_) => "height",
            PropertyEdit::Diameter(_) => "diameter",
            PropertyEdit::Fill(_) => "fill",
            PropertyEdit::FontFamily(_) => "font family",
            PropertyEdit::FontWeight(_) => "font weight",
            PropertyEdit::FontSize(_) => "font size",
        }
    }
}

/// Keeps a [`PropertyPanel`] in sync with the canvas selection and writes edits back.
pub struct PropertyBinder {
    panel: Rc<RefCell<PropertyPanel>>,
    _subscription: Subscription,
}

impl PropertyBinder {
    /// Subscribe to selection and modification events on `bus`.
    pub fn attach(bus: &EventBus) -> Self {
        let panel = Rc::new(RefCell::new(PropertyPanel::default()));
        let state = Rc::clone(&panel);
        let subscription = bus.subscribe(
            &[
                Topic::ObjectSelected,
                Topic::ObjectDeselected,
                Topic::ObjectModified,
                Topic::ObjectScaling,
            ],
            Box::new(move |canvas, event| {
                let mut panel = state.borrow_mut();
                match event {
                    CanvasEvent::ObjectDeselected(_) => *panel = PropertyPanel::default(),
                    CanvasEvent::ObjectSelected(id)
                    | CanvasEvent::ObjectModified(id)
                    | CanvasEvent::ObjectScaling(id) => {
                        if canvas.active() == Some(*id) {
                            if let Some(shape) = canvas.get(*id) {
                                *panel = PropertyPanel::from_shape(shape);
                            }
                        }
                    }
                    _ => {}
                }
            }),
        );
        Self {
            panel,
            _subscription: subscription,
        }
    }

    /// Current panel state.
    pub fn panel(&self) -> PropertyPanel {
        self.panel.borrow().clone()
    }

    /// Apply `edit` to the active object.
    ///
    /// Invalid input is rejected before anything changes, so the panel keeps
    /// showing the object's real state.
    pub fn apply(&self, canvas: &mut Canvas, edit: PropertyEdit) -> EditorResult<()> {
        let id = canvas
            .active()
            .ok_or_else(|| EditorError::Validation("no object selected".to_string()))?;
        let shape = canvas.get_mut(id).ok_or(EditorError::UnknownObject(id))?;
        let kind = shape.kind();

        match (shape, &edit) {
            (Shape::Rectangle(r), PropertyEdit::Width(input)) => {
                r.width = parse_dimension("width", input)? / r.props.scale_x;
            }
            (Shape::Frame(f), PropertyEdit::Width(input)) => {
                f.width = parse_dimension("width", input)? / f.props.scale_x;
            }
            (Shape::Rectangle(r), PropertyEdit::Height(input)) => {
                r.height = parse_dimension("height", input)? / r.props.scale_y;
            }
            (Shape::Frame(f), PropertyEdit::Height(input)) => {
                f.height = parse_dimension("height", input)? / f.props.scale_y;
            }
            (Shape::Circle(circle), PropertyEdit::Diameter(input)) => {
                circle.set_diameter(parse_dimension("diameter", input)?);
            }
            (shape, PropertyEdit::Fill(input))
                if !matches!(kind, ShapeKind::Line | ShapeKind::Image) =>
            {
                shape.props_mut().fill = parse_color("fill", input)?;
            }
            (Shape::Textbox(text), PropertyEdit::FontFamily(family)) => text.font_family = *family,
            (Shape::Textbox(text), PropertyEdit::FontWeight(weight)) => text.font_weight = *weight,
            (Shape::Textbox(text), PropertyEdit::FontSize(input)) => {
                let size = parse_integer("font size", input)?;
                if size == 0 {
                    return Err(EditorError::Validation("font size must be positive".to_string()));
                }
                text.font_size = size;
            }
            _ => {
                return Err(EditorError::Validation(format!(
                    "{} has no {} property",
                    kind.name(),
                    edit.field()
                )));
            }
        }

        if let Some(shape) = canvas.get(id) {
            *self.panel.borrow_mut() = PropertyPanel::from_shape(shape);
        }
        canvas.render();
        Ok(())
    }

    /// Remove the active object and clear the panel.
    pub fn delete_selected(&self, canvas: &mut Canvas) -> EditorResult<Shape> {
        let id = canvas
            .active()
            .ok_or_else(|| EditorError::Validation("no object selected".to_string()))?;
        let removed = canvas.remove(id).ok_or(EditorError::UnknownObject(id))?;
        *self.panel.borrow_mut() = PropertyPanel::default();
        canvas.render();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::shapes::CssColor;

    fn setup() -> (Canvas, EventBus, PropertyBinder) {
        let canvas = Canvas::new(500, 500, CssColor::new("#ffffff"));
        let bus = EventBus::new();
        let binder = PropertyBinder::attach(&bus);
        (canvas, bus, binder)
    }

    fn pump(canvas: &mut Canvas, bus: &EventBus) {
        for event in canvas.take_events() {
            bus.emit(canvas, &event);
        }
    }

    #[test]
    fn test_rectangle_projection() {
        let (mut canvas, bus, binder) = setup();
        let id = canvas.add(factory::default_rectangle().into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);

        let panel = binder.panel();
        assert_eq!(panel.width, "100");
        assert_eq!(panel.height, "60");
        assert_eq!(panel.fill, "blue");
        assert_eq!(panel.diameter, "");
    }

    #[test]
    fn test_circle_diameter_roundtrip() {
        let (mut canvas, bus, binder) = setup();
        let mut circle = factory::default_circle();
        circle.props.scale_x = 1.7;
        let id = canvas.add(circle.into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);
        assert_eq!(binder.panel().diameter, "170");

        binder.apply(&mut canvas, PropertyEdit::Diameter("123".into())).unwrap();
        assert_eq!(binder.panel().diameter, "123");
        match canvas.get(id) {
            Some(Shape::Circle(c)) => assert!((c.diameter() - 123.0).abs() < 1.0),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn test_width_divides_by_scale() {
        let (mut canvas, bus, binder) = setup();
        let mut rect = factory::default_rectangle();
        rect.props.scale_x = 2.0;
        let id = canvas.add(rect.into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);

        binder.apply(&mut canvas, PropertyEdit::Width("1,000".into())).unwrap();
        match canvas.get(id) {
            Some(Shape::Rectangle(r)) => assert!((r.width - 500.0).abs() < f64::EPSILON),
            other => panic!("expected rectangle, got {other:?}"),
        }
        assert_eq!(binder.panel().width, "1000");
    }

    #[test]
    fn test_invalid_input_changes_nothing() {
        let (mut canvas, bus, binder) = setup();
        let id = canvas.add(factory::default_rectangle().into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);
        let before = binder.panel();

        for input in ["-10", "ten", ""] {
            let err = binder.apply(&mut canvas, PropertyEdit::Width(input.into()));
            assert!(matches!(err, Err(EditorError::Validation(_))));
        }
        assert_eq!(binder.panel(), before);
        match canvas.get(id) {
            Some(Shape::Rectangle(r)) => assert!((r.width - 100.0).abs() < f64::EPSILON),
            other => panic!("expected rectangle, got {other:?}"),
        }
    }

    #[test]
    fn test_fill_non_ascii_rejected() {
        let (mut canvas, bus, binder) = setup();
        let id = canvas.add(factory::default_rectangle().into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);

        let result = binder.apply(&mut canvas, PropertyEdit::Fill("#é1".into()));
        assert!(matches!(result, Err(EditorError::Validation(_))));
        assert_eq!(binder.panel().fill, "blue");
        assert_eq!(canvas.get(id).map(|s| s.props().fill.as_str()), Some("blue"));
    }

    #[test]
    fn test_textbox_fields() {
        let (mut canvas, bus, binder) = setup();
        let id = canvas.add(factory::default_textbox().into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);

        binder.apply(&mut canvas, PropertyEdit::FontWeight(FontWeight::Bolder)).unwrap();
        binder.apply(&mut canvas, PropertyEdit::FontSize("36".into())).unwrap();
        assert!(binder.apply(&mut canvas, PropertyEdit::FontSize("0".into())).is_err());
        let panel = binder.panel();
        assert_eq!(panel.font_weight, Some(FontWeight::Bolder));
        assert_eq!(panel.font_size, "36");
    }

    #[test]
    fn test_unsupported_field() {
        let (mut canvas, bus, binder) = setup();
        let id = canvas.add(factory::default_circle().into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);
        let err = binder.apply(&mut canvas, PropertyEdit::Width("10".into()));
        assert!(matches!(err, Err(EditorError::Validation(_))));
    }

    #[test]
    fn test_delete_clears_panel() {
        let (mut canvas, bus, binder) = setup();
        let id = canvas.add(factory::default_rectangle().into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);
        assert!(!binder.panel().is_empty());

        binder.delete_selected(&mut canvas).unwrap();
        assert!(binder.panel().is_empty());
        assert!(!canvas.contains(id));
        pump(&mut canvas, &bus);
        assert!(binder.panel().is_empty());
    }

    #[test]
    fn test_deselect_clears_panel() {
        let (mut canvas, bus, binder) = setup();
        let id = canvas.add(factory::default_circle().into());
        canvas.set_active(id).unwrap();
        pump(&mut canvas, &bus);
        canvas.discard_active();
        pump(&mut canvas, &bus);
        assert!(binder.panel().is_empty());
    }
}
