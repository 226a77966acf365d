//! Text input parsing and the canvas settings form.

use crate::canvas::Canvas;
use crate::error::{EditorError, EditorResult};
use crate::shapes::CssColor;

/// Parse a non-negative number typed by the user. Thousands separators are ignored.
pub fn parse_dimension(field: &str, input: &str) -> EditorResult<f64> {
    let cleaned: String = input.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| EditorError::Validation(format!("{field} must be a number, got {input:?}")))?;
    if !value.is_finite() {
        return Err(EditorError::Validation(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(EditorError::Validation(format!("{field} must not be negative")));
    }
    Ok(value)
}

/// Parse a non-negative whole number. Thousands separators are ignored.
pub fn parse_integer(field: &str, input: &str) -> EditorResult<u32> {
    let cleaned: String = input.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.starts_with('-') {
        return Err(EditorError::Validation(format!("{field} must not be negative")));
    }
    cleaned
        .parse()
        .map_err(|_| EditorError::Validation(format!("{field} must be a whole number, got {input:?}")))
}

/// Parse a CSS colour, rejecting values that cannot be rendered.
pub fn parse_color(field: &str, input: &str) -> EditorResult<CssColor> {
    let color = CssColor::new(input.trim());
    if color.rgba().is_none() {
        return Err(EditorError::Validation(format!("{field}: unknown colour {input:?}")));
    }
    Ok(color)
}

/// The canvas size and background inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSettingsForm {
    pub width: String,
    pub height: String,
    pub background: String,
}

impl CanvasSettingsForm {
    /// Form prefilled from the canvas.
    pub fn from_canvas(canvas: &Canvas) -> Self {
        Self {
            width: canvas.width().to_string(),
            height: canvas.height().to_string(),
            background: canvas.background().to_string(),
        }
    }

    /// Change the width input and apply it. Invalid input leaves both the form and the canvas unchanged.
    pub fn set_width(&mut self, canvas: &mut Canvas, input: &str) -> EditorResult<()> {
        let width = parse_integer("width", input)?;
        canvas.set_dimensions(width, canvas.height());
        self.width = width.to_string();
        Ok(())
    }

    pub fn set_height(&mut self, canvas: &mut Canvas, input: &str) -> EditorResult<()> {
        let height = parse_integer("height", input)?;
        canvas.set_dimensions(canvas.width(), height);
        self.height = height.to_string();
        Ok(())
    }

    pub fn set_background(&mut self, canvas: &mut Canvas, input: &str) -> EditorResult<()> {
        let color = parse_color("background", input)?;
        self.background = color.to_string();
        canvas.set_background_color(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension_strips_separators() {
        assert!((parse_dimension("width", "1,200").unwrap() - 1200.0).abs() < f64::EPSILON);
        assert!((parse_dimension("width", " 12.5 ").unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_dimension_rejects() {
        assert!(parse_dimension("width", "-5").is_err());
        assert!(parse_dimension("width", "abc").is_err());
        assert!(parse_dimension("width", "").is_err());
        assert!(parse_dimension("width", "inf").is_err());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("size", "2,048").unwrap(), 2048);
        assert!(parse_integer("size", "-1").is_err());
        assert!(parse_integer("size", "1.5").is_err());
    }

    #[test]
    fn test_form_applies_to_canvas() {
        let mut canvas = Canvas::new(500, 500, CssColor::new("#ffffff"));
        let mut form = CanvasSettingsForm::from_canvas(&canvas);
        form.set_width(&mut canvas, "1,000").unwrap();
        form.set_background(&mut canvas, "#ff0000").unwrap();
        assert_eq!(canvas.width(), 1000);
        assert_eq!(form.width, "1000");
        assert_eq!(canvas.background().as_str(), "#ff0000");
    }

    #[test]
    fn test_form_rejects_invalid_without_change() {
        let mut canvas = Canvas::new(500, 500, CssColor::new("#ffffff"));
        let mut form = CanvasSettingsForm::from_canvas(&canvas);
        assert!(form.set_height(&mut canvas, "-20").is_err());
        assert!(form.set_background(&mut canvas, "bluish").is_err());
        assert_eq!(canvas.height(), 500);
        assert_eq!(form, CanvasSettingsForm::from_canvas(&canvas));
    }

    #[test]
    fn test_background_non_ascii_rejected() {
        let mut canvas = Canvas::new(500, 500, CssColor::new("#ffffff"));
        let mut form = CanvasSettingsForm::from_canvas(&canvas);
        let result = form.set_background(&mut canvas, "#é1");
        assert!(matches!(result, Err(EditorError::Validation(_))));
        assert_eq!(canvas.background().as_str(), "#ffffff");
    }
}
