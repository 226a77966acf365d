//! Isosceles triangle shape.

use super::{CssColor, ObjectId, ObjectProps, ShapeTrait};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A triangle with its apex at the top centre of its box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ObjectId,
    pub width: f64,
    pub height: f64,
    pub props: ObjectProps,
}

impl Triangle {
    pub fn new(
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        fill: impl Into<CssColor>,
        stroke: impl Into<CssColor>,
        stroke_width: f64,
    ) -> Self {
        let mut props = ObjectProps::at(left, top, fill);
        props.stroke = Some(stroke.into());
        props.stroke_width = stroke_width;
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            props,
        }
    }

    /// Vertices in canvas coordinates: apex, bottom-right, bottom-left.
    pub fn vertices(&self) -> [Point; 3] {
        let b = self.bounds();
        [
            Point::new(b.center().x, b.y0),
            Point::new(b.x1, b.y1),
            Point::new(b.x0, b.y1),
        ]
    }
}

impl ShapeTrait for Triangle {
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
