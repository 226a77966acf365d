//! Drawable object definitions for the garment canvas.

mod circle;
mod frame;
mod image;
mod line;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use frame::{Frame, frame_name, parse_frame_name};
pub use image::{Image, ImageFormat};
pub use line::{GuidelineKind, Line};
pub use rectangle::Rectangle;
pub use text::{FontFamily, FontWeight, Textbox};
pub use triangle::Triangle;

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for objects on the canvas.
pub type ObjectId = Uuid;

/// A CSS colour value as entered by the user (`"blue"`, `"#07FE3D"`, `"transparent"`).
///
/// The original text is kept so property panels can display exactly what was set;
/// [`CssColor::rgba`] resolves it for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssColor(String);

impl CssColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn transparent() -> Self {
        Self::new("transparent")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to RGBA8. Returns `None` for values that cannot be parsed.
    pub fn rgba(&self) -> Option<[u8; 4]> {
        let value = self.0.trim().to_ascii_lowercase();
        if value == "transparent" {
            return Some([0, 0, 0, 0]);
        }

        if let Some(hex) = value.strip_prefix('#') {
            if !hex.is_ascii() {
                return None;
            }
            let channel = |s: &str| u8::from_str_radix(s, 16).ok();
            return match hex.len() {
                3 => {
                    let r = channel(&hex[0..1])? * 17;
                    let g = channel(&hex[1..2])? * 17;
                    let b = channel(&hex[2..3])? * 17;
                    Some([r, g, b, 255])
                }
                6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 255]),
                8 => Some([
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                    channel(&hex[6..8])?,
                ]),
                _ => None,
            };
        }

        named_color(&value)
    }

    /// Whether this colour paints nothing.
    pub fn is_transparent(&self) -> bool {
        matches!(self.rgba(), Some([_, _, _, 0]))
    }
}

impl From<&str> for CssColor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for CssColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn named_color(name: &str) -> Option<[u8; 4]> {
    let rgb = match name {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "pink" => [255, 192, 203],
        "brown" => [165, 42, 42],
        "gray" | "grey" => [128, 128, 128],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "navy" => [0, 0, 128],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 255])
}

/// Attributes shared by every drawable object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectProps {
    /// Left edge in canvas units.
    pub left: f64,
    /// Top edge in canvas units.
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees, around the object centre.
    #[serde(default)]
    pub angle: f64,
    pub fill: CssColor,
    pub stroke: Option<CssColor>,
    pub stroke_width: f64,
    /// Dash pattern (on, off) for the stroke.
    #[serde(default)]
    pub stroke_dash: Option<(f64, f64)>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub selectable: bool,
    pub evented: bool,
    #[serde(default)]
    pub name: Option<String>,
    pub visible: bool,
}

fn default_opacity() -> f64 {
    1.0
}

impl ObjectProps {
    /// Props for an object placed at `(left, top)` with the given fill.
    pub fn at(left: f64, top: f64, fill: impl Into<CssColor>) -> Self {
        Self {
            left,
            top,
            fill: fill.into(),
            ..Self::default()
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn set_position(&mut self, position: Point) {
        self.left = position.x;
        self.top = position.y;
    }
}

impl Default for ObjectProps {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            fill: CssColor::new("black"),
            stroke: None,
            stroke_width: 1.0,
            stroke_dash: None,
            opacity: 1.0,
            selectable: true,
            evented: true,
            name: None,
            visible: true,
        }
    }
}

/// Common trait for all drawable objects.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    fn props(&self) -> &ObjectProps;

    fn props_mut(&mut self) -> &mut ObjectProps;

    /// Intrinsic size before scale factors are applied.
    fn base_size(&self) -> Size;

    /// On-screen size: `width × scale_x` by `height × scale_y`.
    fn effective_size(&self) -> Size {
        let base = self.base_size();
        let props = self.props();
        Size::new(base.width * props.scale_x, base.height * props.scale_y)
    }

    /// Axis-aligned bounds in canvas coordinates (rotation is ignored).
    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.props().position(), self.effective_size())
    }

    /// Check if a point hits this object.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }
}

/// Variant tag of a [`Shape`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Textbox,
    Image,
    Frame,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
            ShapeKind::Textbox => "textbox",
            ShapeKind::Image => "image",
            ShapeKind::Frame => "frame",
        }
    }
}

/// Closed set of drawable objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Line(Line),
    Textbox(Textbox),
    Image(Image),
    Frame(Frame),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Triangle(_) => ShapeKind::Triangle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Textbox(_) => ShapeKind::Textbox,
            Shape::Image(_) => ShapeKind::Image,
            Shape::Frame(_) => ShapeKind::Frame,
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Circle(s) => s.id(),
            Shape::Triangle(s) => s.id(),
            Shape::Line(s) => s.id(),
            Shape::Textbox(s) => s.id(),
            Shape::Image(s) => s.id(),
            Shape::Frame(s) => s.id(),
        }
    }

    pub fn props(&self) -> &ObjectProps {
        match self {
            Shape::Rectangle(s) => s.props(),
            Shape::Circle(s) => s.props(),
            Shape::Triangle(s) => s.props(),
            Shape::Line(s) => s.props(),
            Shape::Textbox(s) => s.props(),
            Shape::Image(s) => s.props(),
            Shape::Frame(s) => s.props(),
        }
    }

    pub fn props_mut(&mut self) -> &mut ObjectProps {
        match self {
            Shape::Rectangle(s) => s.props_mut(),
            Shape::Circle(s) => s.props_mut(),
            Shape::Triangle(s) => s.props_mut(),
            Shape::Line(s) => s.props_mut(),
            Shape::Textbox(s) => s.props_mut(),
            Shape::Image(s) => s.props_mut(),
            Shape::Frame(s) => s.props_mut(),
        }
    }

    pub fn base_size(&self) -> Size {
        match self {
            Shape::Rectangle(s) => s.base_size(),
            Shape::Circle(s) => s.base_size(),
            Shape::Triangle(s) => s.base_size(),
            Shape::Line(s) => s.base_size(),
            Shape::Textbox(s) => s.base_size(),
            Shape::Image(s) => s.base_size(),
            Shape::Frame(s) => s.base_size(),
        }
    }

    pub fn effective_size(&self) -> Size {
        let base = self.base_size();
        let props = self.props();
        Size::new(base.width * props.scale_x, base.height * props.scale_y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.props().position(), self.effective_size())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Circle(s) => s.hit_test(point, tolerance),
            Shape::Line(s) => s.hit_test(point, tolerance),
            _ => self.bounds().inflate(tolerance, tolerance).contains(point),
        }
    }

    /// Human-readable name, if any.
    pub fn name(&self) -> Option<&str> {
        self.props().name.as_deref()
    }

    /// Guideline tag, for structural snap lines.
    pub fn guideline(&self) -> Option<GuidelineKind> {
        match self {
            Shape::Line(line) => line.guide,
            _ => None,
        }
    }

    /// Structural objects are editor overlays, never user content.
    pub fn is_structural(&self) -> bool {
        self.guideline().is_some()
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Shape::Frame(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_frame_mut(&mut self) -> Option<&mut Frame> {
        match self {
            Shape::Frame(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Shape::Frame(_))
    }

}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Shape {
                fn from(shape: $variant) -> Self {
                    Shape::$variant(shape)
                }
            }
        )*
    };
}

impl_from_variant!(Rectangle, Circle, Triangle, Line, Textbox, Image, Frame);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color_hex() {
        assert_eq!(CssColor::new("#07FE3D").rgba(), Some([7, 254, 61, 255]));
        assert_eq!(CssColor::new("#fff").rgba(), Some([255, 255, 255, 255]));
        assert_eq!(CssColor::new("#00000080").rgba(), Some([0, 0, 0, 128]));
    }

    #[test]
    fn test_css_color_non_ascii_hex() {
        assert_eq!(CssColor::new("#é1").rgba(), None);
        assert_eq!(CssColor::new("#ffé").rgba(), None);
        assert_eq!(CssColor::new("#日本").rgba(), None);
    }

    #[test]
    fn test_css_color_named() {
        assert_eq!(CssColor::new("blue").rgba(), Some([0, 0, 255, 255]));
        assert_eq!(CssColor::new("Red").rgba(), Some([255, 0, 0, 255]));
        assert!(CssColor::transparent().is_transparent());
        assert_eq!(CssColor::new("not-a-colour").rgba(), None);
    }

    #[test]
    fn test_effective_size_scales() {
        let mut rect = Rectangle::new(0.0, 0.0, 100.0, 60.0, "blue");
        rect.props.scale_x = 2.5;
        rect.props.scale_y = 0.5;
        let shape = Shape::from(rect);
        let size = shape.effective_size();
        assert!((size.width - 250.0).abs() < f64::EPSILON);
        assert!((size.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_guideline_tag_marks_structural() {
        let guide = Line::guideline(GuidelineKind::VerticalLeft, 0.0, 500.0);
        let plain = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), "black", 2.0);
        assert!(Shape::from(guide).is_structural());
        assert!(!Shape::from(plain).is_structural());
    }

    #[test]
    fn test_guideline_named_by_kind() {
        let guide = Line::guideline(GuidelineKind::VerticalLeft, 0.0, 500.0);
        assert_eq!(guide.props.name.as_deref(), Some("vertical-left"));
    }
}
