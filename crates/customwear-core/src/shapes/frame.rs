//! Crop frames: rectangles that mark an export region.

use super::{CssColor, ObjectId, ObjectProps, ShapeTrait};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const FRAME_PREFIX: &str = "Frame ";

/// Format the display name of frame number `n`.
pub fn frame_name(n: u32) -> String {
    format!("{FRAME_PREFIX}{n}")
}

/// Parse `Frame <n>` into `n`.
pub fn parse_frame_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(FRAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A rectangular crop frame. Transparent fill, thin accent border.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub(crate) id: ObjectId,
    pub width: f64,
    pub height: f64,
    pub props: ObjectProps,
}

impl Frame {
    /// Border width a frame always returns to.
    pub const STROKE_WIDTH: f64 = 1.0;

    pub fn new(
        number: u32,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        accent: impl Into<CssColor>,
    ) -> Self {
        let mut props = ObjectProps::at(left, top, CssColor::transparent());
        props.stroke = Some(accent.into());
        props.stroke_width = Self::STROKE_WIDTH;
        props.name = Some(frame_name(number));
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            props,
        }
    }

    pub fn name(&self) -> &str {
        self.props.name.as_deref().unwrap_or_default()
    }

    /// Fold the current scale into width/height and reset the border.
    ///
    /// Idempotent: a second call with scale already 1 changes nothing.
    pub fn normalize_scale(&mut self) {
        self.width *= self.props.scale_x;
        self.height *= self.props.scale_y;
        self.props.scale_x = 1.0;
        self.props.scale_y = 1.0;
        self.props.stroke_width = Self::STROKE_WIDTH;
    }
}

impl ShapeTrait for Frame {
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
