//! Object factories with the editor's creation-time defaults.

use crate::config::FrameDefaults;
use crate::error::EditorResult;
use crate::images::ImageSource;
use crate::shapes::{
    Circle, CssColor, FontFamily, FontWeight, Frame, Image, Line, Rectangle, Textbox, Triangle,
};
use kurbo::Point;

pub fn rectangle(top: f64, left: f64, width: f64, height: f64, fill: impl Into<CssColor>) -> Rectangle {
    Rectangle::new(left, top, width, height, fill)
}

/// Toolbar rectangle: 100×60, blue, at (50, 100).
pub fn default_rectangle() -> Rectangle {
    rectangle(100.0, 50.0, 100.0, 60.0, "blue")
}

pub fn circle(top: f64, left: f64, radius: f64, fill: impl Into<CssColor>) -> Circle {
    Circle::new(left, top, radius, fill)
}

/// Toolbar circle: radius 50, red, at (150, 150).
pub fn default_circle() -> Circle {
    circle(150.0, 150.0, 50.0, "red")
}

pub fn triangle(
    top: f64,
    left: f64,
    width: f64,
    height: f64,
    fill: impl Into<CssColor>,
    stroke: impl Into<CssColor>,
    stroke_width: f64,
) -> Triangle {
    Triangle::new(left, top, width, height, fill, stroke, stroke_width)
}

/// Toolbar triangle: 100×100 at (100, 100), green with a thin black border.
pub fn default_triangle() -> Triangle {
    triangle(100.0, 100.0, 100.0, 100.0, "green", "black", 1.0)
}

pub fn line(points: (Point, Point), stroke: impl Into<CssColor>, stroke_width: f64) -> Line {
    Line::new(points.0, points.1, stroke, stroke_width)
}

/// Toolbar line from (50, 50) to (200, 200), black, 2 units wide.
pub fn default_line() -> Line {
    line((Point::new(50.0, 50.0), Point::new(200.0, 200.0)), "black", 2.0)
}

pub fn textbox(
    text: impl Into<String>,
    left: f64,
    top: f64,
    font_family: FontFamily,
    font_weight: FontWeight,
    font_size: u32,
    fill: impl Into<CssColor>,
) -> Textbox {
    Textbox::new(text, left, top, fill)
        .with_font_family(font_family)
        .with_font_weight(font_weight)
        .with_font_size(font_size)
}

/// Toolbar text: "Your text here", Arial 24, black, at (100, 100).
pub fn default_textbox() -> Textbox {
    textbox(
        "Your text here",
        100.0,
        100.0,
        FontFamily::Arial,
        FontWeight::Normal,
        24,
        "black",
    )
}

/// Frame number `number` with the configured position, size and accent.
pub fn frame(number: u32, defaults: &FrameDefaults) -> Frame {
    Frame::new(
        number,
        defaults.left,
        defaults.top,
        defaults.width,
        defaults.height,
        defaults.accent.clone(),
    )
}

/// Load the image at `path` and size it for placement.
///
/// The image is scaled to `target` width and then to `target` height, so the
/// final scale is uniform and fits the height. Nothing is inserted anywhere:
/// the caller decides what to do with the result.
pub async fn image(source: &dyn ImageSource, path: &str, target: f64) -> EditorResult<Image> {
    let mut image = source.load(path).await?;
    image.scale_to_width(target);
    image.scale_to_height(target);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use crate::images::{MemoryImageSource, test_png};
    use crate::shapes::ShapeTrait;
    use pollster::block_on;

    #[test]
    fn test_default_rectangle() {
        let rect = default_rectangle();
        assert!((rect.props.left - 50.0).abs() < f64::EPSILON);
        assert!((rect.props.top - 100.0).abs() < f64::EPSILON);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 60.0).abs() < f64::EPSILON);
        assert_eq!(rect.props.fill.as_str(), "blue");
    }

    #[test]
    fn test_default_circle() {
        let c = default_circle();
        assert!((c.radius - 50.0).abs() < f64::EPSILON);
        assert_eq!(c.props.fill.as_str(), "red");
    }

    #[test]
    fn test_default_text_and_line() {
        let t = default_textbox();
        assert_eq!(t.text, "Your text here");
        assert_eq!(t.font_size, 24);
        let l = default_line();
        assert!((l.props.stroke_width - 2.0).abs() < f64::EPSILON);
        assert!((l.bounds().width() - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_frame_from_defaults() {
        let f = frame(3, &FrameDefaults::default());
        assert_eq!(f.name(), "Frame 3");
        assert!((f.props.left - 100.0).abs() < f64::EPSILON);
        assert!((f.width - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_scaled_to_target() {
        let source = MemoryImageSource::new();
        source.insert("T-Shirt.png", test_png(200, 100));
        let img = block_on(image(&source, "T-Shirt.png", 400.0)).unwrap();
        let size = img.effective_size();
        assert!((size.height - 400.0).abs() < 1e-9);
        assert!((size.width - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_failure_reported() {
        let source = MemoryImageSource::new();
        let result = block_on(image(&source, "missing.png", 400.0));
        assert!(matches!(result, Err(EditorError::Decode { .. })));
    }
}
