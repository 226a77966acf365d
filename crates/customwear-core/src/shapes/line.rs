//! Straight line shape, also used for snap guidelines.

use super::{CssColor, ObjectId, ObjectProps, ShapeTrait};
use kurbo::{Line as KurboLine, ParamCurveNearest, Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which alignment a snap guideline marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuidelineKind {
    VerticalLeft,
    VerticalRight,
    VerticalCenter,
    HorizontalTop,
    HorizontalBottom,
    HorizontalCenter,
}

impl GuidelineKind {
    pub fn is_vertical(self) -> bool {
        matches!(
            self,
            GuidelineKind::VerticalLeft | GuidelineKind::VerticalRight | GuidelineKind::VerticalCenter
        )
    }

    /// Stable identifier used for the guideline's object name.
    pub fn label(self) -> &'static str {
        match self {
            GuidelineKind::VerticalLeft => "vertical-left",
            GuidelineKind::VerticalRight => "vertical-right",
            GuidelineKind::VerticalCenter => "vertical-center",
            GuidelineKind::HorizontalTop => "horizontal-top",
            GuidelineKind::HorizontalBottom => "horizontal-bottom",
            GuidelineKind::HorizontalCenter => "horizontal-center",
        }
    }
}

/// A straight segment. Endpoints are stored relative to `(left, top)`, unscaled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ObjectId,
    pub start: Point,
    pub end: Point,
    /// Set only for snap guidelines.
    #[serde(default)]
    pub guide: Option<GuidelineKind>,
    pub props: ObjectProps,
}

impl Line {
    /// Create a line between two canvas points.
    pub fn new(p1: Point, p2: Point, stroke: impl Into<CssColor>, stroke_width: f64) -> Self {
        let left = p1.x.min(p2.x);
        let top = p1.y.min(p2.y);
        let stroke = stroke.into();
        let mut props = ObjectProps::at(left, top, stroke.clone());
        props.stroke = Some(stroke);
        props.stroke_width = stroke_width;
        Self {
            id: Uuid::new_v4(),
            start: Point::new(p1.x - left, p1.y - top),
            end: Point::new(p2.x - left, p2.y - top),
            guide: None,
            props,
        }
    }

    /// Create a non-interactive dashed guideline spanning `extent` at `position`.
    ///
    /// Vertical guidelines run from `(position, 0)` to `(position, extent)`;
    /// horizontal ones from `(0, position)` to `(extent, position)`.
    pub fn guideline(kind: GuidelineKind, position: f64, extent: f64) -> Self {
        let (p1, p2) = if kind.is_vertical() {
            (Point::new(position, 0.0), Point::new(position, extent))
        } else {
            (Point::new(0.0, position), Point::new(extent, position))
        };
        let mut line = Self::new(p1, p2, "red", 1.0);
        line.guide = Some(kind);
        line.props.stroke_dash = Some((5.0, 5.0));
        line.props.opacity = 0.8;
        line.props.selectable = false;
        line.props.evented = false;
        line.props.name = Some(kind.label().to_string());
        line
    }

    /// Endpoints in canvas coordinates.
    pub fn endpoints(&self) -> (Point, Point) {
        let p = &self.props;
        let map = |pt: Point| Point::new(p.left + pt.x * p.scale_x, p.top + pt.y * p.scale_y);
        (map(self.start), map(self.end))
    }

    pub fn as_kurbo(&self) -> KurboLine {
        let (a, b) = self.endpoints();
        KurboLine::new(a, b)
    }
}

impl ShapeTrait for Line {
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
        Size::new(
            (self.end.x - self.start.x).abs(),
            (self.end.y - self.start.y).abs(),
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let nearest = self.as_kurbo().nearest(point, 0.1);
        nearest.distance_sq.sqrt() <= tolerance + self.props.stroke_width / 2.0
    }
}
