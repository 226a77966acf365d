//! tiny-skia based rasterizer.

use crate::renderer::{RasterError, RenderResult, encode_png, paint_color, to_transform};
use crate::text::{FontSet, render_textbox};
use customwear_core::canvas::Canvas;
use customwear_core::error::EditorResult;
use customwear_core::export::{RasterImage, Rasterizer};
use customwear_core::shapes::{CssColor, Image, ObjectProps, Shape, ShapeTrait, Textbox};
use kurbo::{Affine, Point, Rect};
use tiny_skia::{
    FillRule, IntSize, Paint, Path, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8,
    Stroke, StrokeDash, Transform,
};

/// Renders canvases on the CPU.
#[derive(Clone, Default)]
pub struct TinySkiaRasterizer {
    fonts: Option<FontSet>,
}

impl TinySkiaRasterizer {
    /// A rasterizer without fonts. Textboxes are skipped.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontSet) -> Self {
        Self { fonts: Some(fonts) }
    }

    /// Render the whole canvas at 1:1.
    ///
    /// Returns `None` for a canvas without pixels.
    pub fn render_canvas(&self, canvas: &Canvas) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(canvas.width(), canvas.height())?;
        if let Some(color) = paint_color(canvas.background(), 1.0) {
            pixmap.fill(color);
        }
        for shape in canvas.objects() {
            self.draw_shape(&mut pixmap, shape);
        }
        Some(pixmap)
    }

    /// Render `region` of the canvas. Pixels outside the canvas stay transparent.
    pub fn render_region(&self, canvas: &Canvas, region: Rect) -> RenderResult<Pixmap> {
        let width = region.width().round();
        let height = region.height().round();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(RasterError::EmptyRegion {
                width: region.width(),
                height: region.height(),
            });
        }
        let (width, height) = (width as u32, height as u32);
        let mut out = Pixmap::new(width, height).ok_or(RasterError::Allocation(width, height))?;

        if let Some(full) = self.render_canvas(canvas) {
            out.draw_pixmap(
                -(region.x0.round() as i32),
                -(region.y0.round() as i32),
                full.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Ok(out)
    }

    fn draw_shape(&self, pixmap: &mut Pixmap, shape: &Shape) {
        let props = shape.props();
        if !props.visible {
            return;
        }
        let transform = to_transform(object_affine(shape));

        match shape {
            Shape::Rectangle(rect) => {
                fill_and_stroke(pixmap, rect_path(rect.width, rect.height), props, transform);
            }
            Shape::Frame(frame) => {
                fill_and_stroke(pixmap, rect_path(frame.width, frame.height), props, transform);
            }
            Shape::Circle(circle) => {
                let r = circle.radius as f32;
                fill_and_stroke(pixmap, PathBuilder::from_circle(r, r, r), props, transform);
            }
            Shape::Triangle(triangle) => {
                let (w, h) = (triangle.width as f32, triangle.height as f32);
                let mut pb = PathBuilder::new();
                pb.move_to(w / 2.0, 0.0);
                pb.line_to(w, h);
                pb.line_to(0.0, h);
                pb.close();
                fill_and_stroke(pixmap, pb.finish(), props, transform);
            }
            Shape::Line(line) => {
                let mut pb = PathBuilder::new();
                pb.move_to(line.start.x as f32, line.start.y as f32);
                pb.line_to(line.end.x as f32, line.end.y as f32);
                if let Some(path) = pb.finish() {
                    let color = props.stroke.as_ref().unwrap_or(&props.fill);
                    stroke_outline(pixmap, &path, color, props, transform);
                }
            }
            Shape::Textbox(text) => self.draw_text(pixmap, text, transform),
            Shape::Image(image) => draw_image(pixmap, image, transform),
        }
    }

    fn draw_text(&self, pixmap: &mut Pixmap, text: &Textbox, transform: Transform) {
        let Some(fonts) = &self.fonts else {
            log::debug!("No font loaded, skipping text {}", text.id());
            return;
        };
        let Some(color) = paint_color(&text.props.fill, 1.0) else {
            return;
        };
        if let Some(glyphs) = render_textbox(fonts, text, color) {
            let paint = PixmapPaint {
                opacity: text.props.opacity.clamp(0.0, 1.0) as f32,
                ..PixmapPaint::default()
            };
            pixmap.draw_pixmap(0, 0, glyphs.as_ref(), &paint, transform, None);
        }
    }
}

impl Rasterizer for TinySkiaRasterizer {
    fn rasterize_region(&self, canvas: &Canvas, region: Rect) -> EditorResult<RasterImage> {
        let pixmap = self.render_region(canvas, region)?;
        let png = encode_png(&pixmap)?;
        log::debug!(
            "Rasterized {}x{} region into {} bytes",
            pixmap.width(),
            pixmap.height(),
            png.len()
        );
        Ok(RasterImage {
            png,
            width: pixmap.width(),
            height: pixmap.height(),
        })
    }
}

/// Map unscaled object coordinates onto the canvas.
///
/// Rotation is about the centre of the scaled box.
fn object_affine(shape: &Shape) -> Affine {
    let props = shape.props();
    let size = shape.effective_size();
    let center = Point::new(size.width / 2.0, size.height / 2.0);
    Affine::translate((props.left, props.top))
        * Affine::rotate_about(props.angle.to_radians(), center)
        * Affine::scale_non_uniform(props.scale_x, props.scale_y)
}

fn rect_path(width: f64, height: f64) -> Option<Path> {
    tiny_skia::Rect::from_xywh(0.0, 0.0, width as f32, height as f32).map(PathBuilder::from_rect)
}

fn fill_and_stroke(pixmap: &mut Pixmap, path: Option<Path>, props: &ObjectProps, transform: Transform) {
    let Some(path) = path else {
        return;
    };
    if let Some(color) = paint_color(&props.fill, props.opacity) {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }
    if let Some(color) = &props.stroke {
        stroke_outline(pixmap, &path, color, props, transform);
    }
}

fn stroke_outline(
    pixmap: &mut Pixmap,
    path: &Path,
    color: &CssColor,
    props: &ObjectProps,
    transform: Transform,
) {
    if props.stroke_width <= 0.0 {
        return;
    }
    let Some(color) = paint_color(color, props.opacity) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: props.stroke_width as f32,
        dash: props
            .stroke_dash
            .and_then(|(on, off)| StrokeDash::new(vec![on as f32, off as f32], 0.0)),
        ..Stroke::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, transform, None);
}

fn draw_image(pixmap: &mut Pixmap, image: &Image, transform: Transform) {
    let Some(decoded) = decode_pixmap(image) else {
        log::warn!("Could not decode {}, drawing placeholder", image.source_path);
        let placeholder = rect_path(f64::from(image.natural_width), f64::from(image.natural_height));
        if let Some(path) = placeholder {
            let mut paint = Paint::default();
            paint.set_color_rgba8(200, 200, 200, 255);
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
        return;
    };
    let paint = PixmapPaint {
        opacity: image.props.opacity.clamp(0.0, 1.0) as f32,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, decoded.as_ref(), &paint, transform, None);
}

/// Decode an image object into a premultiplied pixmap.
fn decode_pixmap(image: &Image) -> Option<Pixmap> {
    let bytes = image.data()?;
    let rgba = ::image::load_from_memory(&bytes).ok()?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, IntSize::from_wh(width, height)?)
}

/// Pixel at `(x, y)` as straight RGBA, or `None` outside the pixmap.
pub fn pixel_rgba(pixmap: &Pixmap, x: u32, y: u32) -> Option<[u8; 4]> {
    let p: PremultipliedColorU8 = pixmap.pixel(x, y)?;
    let c = p.demultiply();
    Some([c.red(), c.green(), c.blue(), c.alpha()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use customwear_core::config::EditorConfig;
    use customwear_core::export::MemoryDownloads;
    use customwear_core::images::MemoryImageSource;
    use customwear_core::session::{EditorSession, SessionServices};
    use customwear_core::shapes::{Frame, Rectangle};
    use customwear_core::storage::MemoryDrawingStore;
    use pollster::block_on;
    use std::sync::Arc;

    fn white_canvas(w: u32, h: u32) -> Canvas {
        Canvas::new(w, h, CssColor::new("#ffffff"))
    }

    #[test]
    fn test_rectangle_pixels() {
        let mut canvas = white_canvas(50, 50);
        canvas.add(Rectangle::new(10.0, 10.0, 20.0, 20.0, "#ff0000").into());
        let pixmap = TinySkiaRasterizer::new().render_canvas(&canvas).unwrap();
        assert_eq!(pixel_rgba(&pixmap, 20, 20), Some([255, 0, 0, 255]));
        assert_eq!(pixel_rgba(&pixmap, 5, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_hidden_objects_not_drawn() {
        let mut canvas = white_canvas(50, 50);
        let mut rect = Rectangle::new(0.0, 0.0, 50.0, 50.0, "#000000");
        rect.props.visible = false;
        canvas.add(rect.into());
        let pixmap = TinySkiaRasterizer::new().render_canvas(&canvas).unwrap();
        assert_eq!(pixel_rgba(&pixmap, 25, 25), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_region_outside_canvas_is_transparent() {
        let canvas = white_canvas(50, 50);
        let region = Rect::new(-10.0, -10.0, 10.0, 10.0);
        let pixmap = TinySkiaRasterizer::new().render_region(&canvas, region).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (20, 20));
        assert_eq!(pixel_rgba(&pixmap, 0, 0).map(|p| p[3]), Some(0));
        assert_eq!(pixel_rgba(&pixmap, 15, 15), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_empty_region_rejected() {
        let canvas = white_canvas(50, 50);
        let result = TinySkiaRasterizer::new().render_region(&canvas, Rect::new(5.0, 5.0, 5.2, 30.0));
        assert!(matches!(result, Err(RasterError::EmptyRegion { .. })));
    }

    #[test]
    fn test_png_dimensions_follow_scale() {
        let mut canvas = white_canvas(500, 500);
        let mut frame = Frame::new(1, 100.0, 100.0, 200.0, 200.0, "#07FE3D");
        frame.props.scale_x = 1.25;
        frame.props.scale_y = 0.5;
        let region = Rect::from_origin_size((100.0, 100.0), (250.0, 100.0));
        canvas.add(frame.into());

        let image = TinySkiaRasterizer::new().rasterize_region(&canvas, region).unwrap();
        assert_eq!((image.width, image.height), (250, 100));
        let decoded = ::image::load_from_memory(&image.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (250, 100));
    }

    #[test]
    fn test_zero_stroke_not_drawn() {
        let mut canvas = white_canvas(50, 50);
        let mut frame = Frame::new(1, 10.0, 10.0, 30.0, 30.0, "#000000");
        frame.props.stroke_width = 0.0;
        canvas.add(frame.into());
        let pixmap = TinySkiaRasterizer::new().render_canvas(&canvas).unwrap();
        assert_eq!(pixel_rgba(&pixmap, 10, 20), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_session_export_isolates_frame() {
        let mut session = EditorSession::new(
            EditorConfig::default(),
            SessionServices {
                images: Arc::new(MemoryImageSource::new()),
                store: Arc::new(MemoryDrawingStore::new()),
                rasterizer: Box::new(TinySkiaRasterizer::new()),
                downloads: Box::new(MemoryDownloads::new()),
            },
        );
        session.add_rectangle();
        session.add_frame();
        let second = session.add_frame();
        session.scale_object(second, 1.5, 1.0).unwrap();
        session.finish_transform(second).unwrap();

        let report = block_on(session.export_frame("Frame 1")).unwrap();
        assert!(report.saved_locally());
        let decoded = ::image::load_from_memory(&report.image.png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (200, 200));
        // Neither frame border shows along the region's edges.
        assert_eq!(decoded.get_pixel(199, 0).0, [255, 255, 255, 255]);
        assert_eq!(decoded.get_pixel(199, 199).0, [255, 255, 255, 255]);
        // The blue toolbar rectangle spans (50,100)-(150,160).
        assert_eq!(decoded.get_pixel(10, 30).0, [0, 0, 255, 255]);

        for frame in session.canvas().frames() {
            assert!(frame.props.visible);
            assert!((frame.props.stroke_width - 1.0).abs() < f64::EPSILON);
        }
    }
}
