//! Image shape for clothing templates and uploaded pictures.

use super::{CssColor, ObjectId, ObjectProps, ShapeTrait};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// A raster image placed on the canvas.
///
/// The image keeps its natural pixel size as base size; placement scaling is
/// expressed through `scale_x`/`scale_y` so the property panel and the export
/// see the same effective size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ObjectId,
    /// Path the image was loaded from.
    pub source_path: String,
    pub natural_width: u32,
    pub natural_height: u32,
    pub format: ImageFormat,
    /// Encoded image bytes, base64.
    pub data_base64: String,
    pub props: ObjectProps,
}

impl Image {
    pub fn new(
        source_path: impl Into<String>,
        data: &[u8],
        natural_width: u32,
        natural_height: u32,
        format: ImageFormat,
    ) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};

        Self {
            id: Uuid::new_v4(),
            source_path: source_path.into(),
            natural_width,
            natural_height,
            format,
            data_base64: STANDARD.encode(data),
            props: ObjectProps::at(0.0, 0.0, CssColor::transparent()),
        }
    }

    /// Uniformly scale so the displayed width equals `width`.
    pub fn scale_to_width(&mut self, width: f64) {
        if self.natural_width == 0 {
            return;
        }
        let scale = width / f64::from(self.natural_width);
        self.props.scale_x = scale;
        self.props.scale_y = scale;
    }

    /// Uniformly scale so the displayed height equals `height`.
    pub fn scale_to_height(&mut self, height: f64) {
        if self.natural_height == 0 {
            return;
        }
        let scale = height / f64::from(self.natural_height);
        self.props.scale_x = scale;
        self.props.scale_y = scale;
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }
}

impl ShapeTrait for Image {
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
        Size::new(f64::from(self.natural_width), f64::from(self.natural_height))
    }
}
