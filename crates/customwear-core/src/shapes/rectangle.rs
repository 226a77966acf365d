//! Rectangle shape.

use super::{CssColor, ObjectId, ObjectProps, ShapeTrait};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ObjectId,
    /// Unscaled width.
    pub width: f64,
    /// Unscaled height.
    pub height: f64,
    pub props: ObjectProps,
}

impl Rectangle {
    /// Create a new rectangle with its top-left corner at `(left, top)`.
    pub fn new(left: f64, top: f64, width: f64, height: f64, fill: impl Into<CssColor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            props: ObjectProps::at(left, top, fill),
        }
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        self.bounds()
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn props(&self) -> &ObjectProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ObjectProps {
        &mut self.props
    }

    fn base_size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(50.0, 100.0, 100.0, 60.0, "blue");
        assert!((rect.props.left - 50.0).abs() < f64::EPSILON);
        assert!((rect.props.top - 100.0).abs() < f64::EPSILON);
        assert_eq!(rect.props.fill.as_str(), "blue");
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(0.0, 0.0, 100.0, 100.0, "blue");
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 10.0));
    }

    #[test]
    fn test_bounds_follow_scale() {
        let mut rect = Rectangle::new(10.0, 20.0, 100.0, 50.0, "blue");
        rect.props.scale_x = 2.0;
        let bounds = rect.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 210.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}
