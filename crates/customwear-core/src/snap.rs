//! Snapping objects to canvas edges and centres while dragging.

use crate::canvas::Canvas;
use crate::error::{EditorError, EditorResult};
use crate::shapes::{GuidelineKind, Line, ObjectId};
use kurbo::{Point, Rect, Size};

/// Distance, in canvas units, within which an edge or centre snaps.
pub const SNAP_THRESHOLD: f64 = 10.0;

/// Result of a snap computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    /// Top-left position after snapping.
    pub position: Point,
    /// Guidelines to show, in evaluation order, without duplicates.
    pub guidelines: Vec<GuidelineKind>,
}

impl SnapOutcome {
    pub fn is_snapped(&self) -> bool {
        !self.guidelines.is_empty()
    }
}

/// Compute where an object with `bounds` snaps on a canvas of size `canvas`.
///
/// All six conditions are tested against the unsnapped bounds in a fixed
/// order: left, top, right, bottom, horizontal centre, vertical centre. When
/// several conditions hold on the same axis the later one decides the final
/// coordinate. A zero-sized canvas is valid; its centre is 0.
pub fn compute_snap(canvas: Size, bounds: Rect) -> SnapOutcome {
    let (canvas_w, canvas_h) = (canvas.width.max(0.0), canvas.height.max(0.0));
    let left = bounds.x0;
    let top = bounds.y0;
    let width = bounds.width();
    let height = bounds.height();
    let right = left + width;
    let bottom = top + height;
    let center_x = left + width / 2.0;
    let center_y = top + height / 2.0;

    let mut position = Point::new(left, top);
    let mut guidelines = Vec::new();
    let mut hit = |kind: GuidelineKind| {
        if !guidelines.contains(&kind) {
            guidelines.push(kind);
        }
    };

    if left.abs() < SNAP_THRESHOLD {
        position.x = 0.0;
        hit(GuidelineKind::VerticalLeft);
    }
    if top.abs() < SNAP_THRESHOLD {
        position.y = 0.0;
        hit(GuidelineKind::HorizontalTop);
    }
    if (right - canvas_w).abs() < SNAP_THRESHOLD {
        position.x = canvas_w - width;
        hit(GuidelineKind::VerticalRight);
    }
    if (bottom - canvas_h).abs() < SNAP_THRESHOLD {
        position.y = canvas_h - height;
        hit(GuidelineKind::HorizontalBottom);
    }
    if (center_x - canvas_w / 2.0).abs() < SNAP_THRESHOLD {
        position.x = canvas_w / 2.0 - width / 2.0;
        hit(GuidelineKind::VerticalCenter);
    }
    if (center_y - canvas_h / 2.0).abs() < SNAP_THRESHOLD {
        position.y = canvas_h / 2.0 - height / 2.0;
        hit(GuidelineKind::HorizontalCenter);
    }

    SnapOutcome {
        position,
        guidelines,
    }
}

/// Line position of a guideline on a canvas of size `canvas`.
pub fn guideline_position(kind: GuidelineKind, canvas: Size) -> f64 {
    match kind {
        GuidelineKind::VerticalLeft | GuidelineKind::HorizontalTop => 0.0,
        GuidelineKind::VerticalRight => canvas.width,
        GuidelineKind::HorizontalBottom => canvas.height,
        GuidelineKind::VerticalCenter => canvas.width / 2.0,
        GuidelineKind::HorizontalCenter => canvas.height / 2.0,
    }
}

/// Snap object `id` on `canvas` and replace the guideline set.
///
/// Existing guidelines are always removed first, so the set present
/// afterwards reflects only this evaluation.
pub fn apply_snap(canvas: &mut Canvas, id: ObjectId) -> EditorResult<SnapOutcome> {
    canvas.clear_guidelines();

    let bounds = canvas
        .get(id)
        .map(|s| s.bounds())
        .ok_or(EditorError::UnknownObject(id))?;
    let size = canvas.size();
    let outcome = compute_snap(size, bounds);

    if let Some(shape) = canvas.get_mut(id) {
        shape.props_mut().set_position(outcome.position);
    }

    for &kind in &outcome.guidelines {
        if canvas.has_guideline(kind) {
            continue;
        }
        let extent = if kind.is_vertical() { size.height } else { size.width };
        let line = Line::guideline(kind, guideline_position(kind, size), extent);
        canvas.add_guideline(line.into());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{CssColor, Rectangle};

    const CANVAS: Size = Size::new(500.0, 500.0);

    fn rect_at(left: f64, top: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size((left, top), (w, h))
    }

    #[test]
    fn test_left_snaps_within_threshold() {
        for left in -9..=9 {
            let outcome = compute_snap(CANVAS, rect_at(f64::from(left), 100.0, 100.0, 60.0));
            assert!((outcome.position.x - 0.0).abs() < f64::EPSILON, "left = {left}");
            let count = outcome
                .guidelines
                .iter()
                .filter(|k| **k == GuidelineKind::VerticalLeft)
                .count();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_left_outside_threshold() {
        for left in [10.0, -10.0, 42.0] {
            let outcome = compute_snap(CANVAS, rect_at(left, 100.0, 100.0, 60.0));
            assert!(!outcome.guidelines.contains(&GuidelineKind::VerticalLeft));
            assert!((outcome.position.x - left).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_right_and_bottom() {
        let outcome = compute_snap(CANVAS, rect_at(395.0, 437.0, 100.0, 60.0));
        assert!((outcome.position.x - 400.0).abs() < f64::EPSILON);
        assert!((outcome.position.y - 440.0).abs() < f64::EPSILON);
        assert_eq!(
            outcome.guidelines,
            vec![GuidelineKind::VerticalRight, GuidelineKind::HorizontalBottom]
        );
    }

    #[test]
    fn test_center_overrides_edge_on_same_axis() {
        // Width 490 matches left, right and centre; centre is evaluated last.
        let outcome = compute_snap(CANVAS, rect_at(3.0, 100.0, 490.0, 10.0));
        assert!((outcome.position.x - 5.0).abs() < f64::EPSILON);
        assert!(outcome.guidelines.contains(&GuidelineKind::VerticalLeft));
        assert!(outcome.guidelines.contains(&GuidelineKind::VerticalCenter));
    }

    #[test]
    fn test_both_axes_snap() {
        let outcome = compute_snap(CANVAS, rect_at(-4.0, 6.0, 50.0, 50.0));
        assert_eq!(outcome.position, Point::new(0.0, 0.0));
        assert_eq!(
            outcome.guidelines,
            vec![GuidelineKind::VerticalLeft, GuidelineKind::HorizontalTop]
        );
    }

    #[test]
    fn test_zero_canvas_does_not_panic() {
        let outcome = compute_snap(Size::ZERO, rect_at(3.0, 3.0, 0.0, 0.0));
        assert_eq!(outcome.position, Point::new(0.0, 0.0));
        assert!(outcome.is_snapped());
    }

    #[test]
    fn test_no_snap_in_middle_of_nowhere() {
        let outcome = compute_snap(CANVAS, rect_at(100.0, 100.0, 60.0, 60.0));
        assert!(!outcome.is_snapped());
    }

    #[test]
    fn test_apply_replaces_guidelines_each_tick() {
        let mut canvas = Canvas::new(500, 500, CssColor::new("#fff"));
        let id = canvas.add(Rectangle::new(-3.0, 100.0, 100.0, 60.0, "blue").into());

        apply_snap(&mut canvas, id).unwrap();
        assert_eq!(canvas.guidelines().len(), 1);
        assert!(canvas.has_guideline(GuidelineKind::VerticalLeft));
        assert!((canvas.get(id).unwrap().props().left - 0.0).abs() < f64::EPSILON);

        canvas.get_mut(id).unwrap().props_mut().left = 300.0;
        canvas.get_mut(id).unwrap().props_mut().top = 5.0;
        apply_snap(&mut canvas, id).unwrap();
        let kinds: Vec<_> = canvas.guidelines().into_iter().map(|(_, k)| k).collect();
        assert_eq!(kinds, vec![GuidelineKind::HorizontalTop]);

        canvas.get_mut(id).unwrap().props_mut().top = 100.0;
        apply_snap(&mut canvas, id).unwrap();
        assert!(canvas.guidelines().is_empty());
    }

    #[test]
    fn test_guideline_geometry() {
        let mut canvas = Canvas::new(400, 300, CssColor::new("#fff"));
        let id = canvas.add(Rectangle::new(150.0, 100.0, 100.0, 100.0, "blue").into());
        apply_snap(&mut canvas, id).unwrap();
        let guide = canvas
            .objects()
            .find(|s| s.guideline() == Some(GuidelineKind::VerticalCenter))
            .unwrap();
        let b = guide.bounds();
        assert!((b.x0 - 200.0).abs() < f64::EPSILON);
        assert!((b.height() - 300.0).abs() < f64::EPSILON);
    }
}
