//! Shared rendering types and helpers.

use customwear_core::error::EditorError;
use customwear_core::shapes::CssColor;
use kurbo::Affine;
use thiserror::Error;
use tiny_skia::{Color, Pixmap, Transform};

/// Rasterizer errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Region {width}x{height} has no pixels")]
    EmptyRegion { width: f64, height: f64 },
    #[error("Could not allocate a {0}x{1} pixmap")]
    Allocation(u32, u32),
    #[error("Invalid font: {0}")]
    Font(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for rasterizer operations.
pub type RenderResult<T> = Result<T, RasterError>;

impl From<RasterError> for EditorError {
    fn from(err: RasterError) -> Self {
        EditorError::Internal(err.to_string())
    }
}

/// Convert a CSS colour into a paint colour, applying `opacity`.
///
/// Returns `None` for colours that draw nothing.
pub(crate) fn paint_color(color: &CssColor, opacity: f64) -> Option<Color> {
    let [r, g, b, a] = color.rgba()?;
    let alpha = (f64::from(a) * opacity.clamp(0.0, 1.0)).round() as u8;
    if alpha == 0 {
        return None;
    }
    Some(Color::from_rgba8(r, g, b, alpha))
}

/// Convert a kurbo affine into a tiny-skia transform.
pub(crate) fn to_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Encode a pixmap to PNG bytes.
pub(crate) fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    let rgba_data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        writer
            .write_image_data(&rgba_data)
            .map_err(|e| RasterError::Encode(e.to_string()))?;
    }

    Ok(png_data)
}
