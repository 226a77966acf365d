//! Circle shape.

use super::{CssColor, ObjectId, ObjectProps, ShapeTrait};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle described by its bounding box origin and radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ObjectId,
    /// Unscaled radius.
    pub radius: f64,
    pub props: ObjectProps,
}

impl Circle {
    pub fn new(left: f64, top: f64, radius: f64, fill: impl Into<CssColor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            radius,
            props: ObjectProps::at(left, top, fill),
        }
    }

    /// Displayed diameter, `radius × 2 × scale_x`.
    pub fn diameter(&self) -> f64 {
        self.radius * 2.0 * self.props.scale_x
    }

    /// Set the radius so the displayed diameter becomes `diameter` at the current scale.
    pub fn set_diameter(&mut self, diameter: f64) {
        self.radius = diameter / 2.0 / self.props.scale_x;
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }
}

impl ShapeTrait for Circle {
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
        Size::new(self.radius * 2.0, self.radius * 2.0)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let size = self.effective_size();
        let rx = size.width / 2.0 + tolerance;
        let ry = size.height / 2.0 + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let center = self.center();
        let dx = (point.x - center.x) / rx;
        let dy = (point.y - center.y) / ry;
        dx * dx + dy * dy <= 1.0
    }
}
