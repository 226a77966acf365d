//! Loading template and picture files into [`Image`] objects.

use crate::error::{EditorError, EditorResult};
use crate::shapes::{Image, ImageFormat};
use crate::storage::BoxFuture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Resolves an image path into a decoded, unplaced [`Image`].
#[cfg(not(target_arch = "wasm32"))]
pub trait ImageSource: Send + Sync {
    fn load(&self, path: &str) -> BoxFuture<'_, EditorResult<Image>>;
}

/// Resolves an image path into a decoded, unplaced [`Image`].
#[cfg(target_arch = "wasm32")]
pub trait ImageSource {
    fn load(&self, path: &str) -> BoxFuture<'_, EditorResult<Image>>;
}

/// Decode `bytes` loaded from `path` into an image object at natural size.
pub fn decode_image(path: &str, bytes: &[u8]) -> EditorResult<Image> {
    let decode_error = |reason: String| EditorError::Decode {
        path: path.to_string(),
        reason,
    };

    let format = ImageFormat::from_magic_bytes(bytes)
        .or_else(|| {
            Path::new(path)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .ok_or_else(|| decode_error("unsupported image format".to_string()))?;

    let decoded = image::load_from_memory(bytes).map_err(|e| decode_error(e.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(decode_error("image has no pixels".to_string()));
    }

    Ok(Image::new(path, bytes, decoded.width(), decoded.height(), format))
}

/// Reads images from a directory on disk.
///
/// Paths are resolved relative to the root; a leading `/` is ignored so web
/// style paths such as `/Clothes/Full_sleeve.webp` work unchanged.
///
/// The returned future reads the file with blocking `std::fs` calls when
/// polled. Drive it with a blocking executor such as `pollster`, or wrap it in
/// `spawn_blocking` when polling from an async runtime.
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> EditorResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches(['/', '\\']));
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(EditorError::Validation(format!("invalid image path: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, path: &str) -> BoxFuture<'_, EditorResult<Image>> {
        let path = path.to_string();
        Box::pin(async move {
            let file = self.resolve(&path)?;
            let bytes = std::fs::read(&file).map_err(|e| EditorError::Decode {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            decode_image(&path, &bytes)
        })
    }
}

/// Image bytes registered ahead of time, keyed by path.
#[derive(Default)]
pub struct MemoryImageSource {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        match self.files.write() {
            Ok(mut files) => {
                files.insert(path.into(), bytes);
            }
            Err(e) => log::error!("Image cache lock poisoned: {}", e),
        }
    }
}

impl ImageSource for MemoryImageSource {
    fn load(&self, path: &str) -> BoxFuture<'_, EditorResult<Image>> {
        let path = path.to_string();
        Box::pin(async move {
            let bytes = self
                .files
                .read()
                .map_err(|e| EditorError::Internal(format!("Lock error: {}", e)))?
                .get(&path)
                .cloned()
                .ok_or_else(|| EditorError::Decode {
                    path: path.clone(),
                    reason: "file not found".to_string(),
                })?;
            decode_image(&path, &bytes)
        })
    }
}

#[cfg(test)]
pub(crate) fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
