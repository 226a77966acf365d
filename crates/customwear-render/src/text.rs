//! Glyph rasterization for textboxes.

use crate::renderer::{RasterError, RenderResult};
use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use customwear_core::shapes::{FontWeight, Textbox};
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Fonts used to draw text. Heavy weights use the bold face when one is loaded.
#[derive(Clone)]
pub struct FontSet {
    regular: FontArc,
    bold: Option<FontArc>,
}

impl FontSet {
    /// Load the regular face from TTF/OTF bytes.
    pub fn from_bytes(regular: Vec<u8>) -> RenderResult<Self> {
        let regular = FontArc::try_from_vec(regular).map_err(|e| RasterError::Font(e.to_string()))?;
        Ok(Self {
            regular,
            bold: None,
        })
    }

    pub fn with_bold(mut self, bold: Vec<u8>) -> RenderResult<Self> {
        self.bold = Some(FontArc::try_from_vec(bold).map_err(|e| RasterError::Font(e.to_string()))?);
        Ok(self)
    }

    fn face(&self, weight: FontWeight) -> &FontArc {
        match &self.bold {
            Some(bold) if weight.is_heavy() => bold,
            _ => &self.regular,
        }
    }
}

/// Positions of each glyph on one line: `(glyph, x)`.
fn layout_line(font: &FontArc, size: f32, line: &str) -> Vec<(GlyphId, f32)> {
    let scaled = font.as_scaled(size);
    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last: Option<GlyphId> = None;
    for ch in line.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor_x += scaled.kern(prev, id);
        }
        glyphs.push((id, cursor_x));
        cursor_x += scaled.h_advance(id);
        last = Some(id);
    }
    glyphs
}

/// Draw `text` into a pixmap of its unscaled box size.
///
/// Returns `None` when the box has no pixels.
pub(crate) fn render_textbox(fonts: &FontSet, text: &Textbox, color: Color) -> Option<Pixmap> {
    let width = text.width.ceil().max(0.0) as u32;
    let line_height = f64::from(text.font_size) * Textbox::LINE_HEIGHT;
    let height = (line_height * text.line_count() as f64).ceil() as u32;
    let mut pixmap = Pixmap::new(width, height)?;

    let font = fonts.face(text.font_weight);
    let size = text.font_size as f32;
    let ascent = font.as_scaled(size).ascent();

    let mut coverage = vec![0.0f32; width as usize * height as usize];
    for (index, line) in text.text.split('\n').enumerate() {
        let baseline = (index as f64 * line_height) as f32 + ascent;
        for (id, x) in layout_line(font, size, line) {
            let glyph = id.with_scale_and_position(size, point(x, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, cov| {
                let px = bounds.min.x as i64 + i64::from(gx);
                let py = bounds.min.y as i64 + i64::from(gy);
                if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                    return;
                }
                let idx = py as usize * width as usize + px as usize;
                coverage[idx] = coverage[idx].max(cov);
            });
        }
    }

    for (pixel, cov) in pixmap.pixels_mut().iter_mut().zip(coverage) {
        if cov <= 0.0 {
            continue;
        }
        let alpha = (color.alpha() * cov).clamp(0.0, 1.0);
        let channel = |c: f32| (c * alpha * 255.0).round() as u8;
        *pixel = PremultipliedColorU8::from_rgba(
            channel(color.red()),
            channel(color.green()),
            channel(color.blue()),
            (alpha * 255.0).round() as u8,
        )
        .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }

    Some(pixmap)
}
