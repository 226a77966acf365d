//! CustomWear Render Library
//!
//! CPU rasterization of editor canvases.
//! The default implementation uses tiny-skia and encodes exports as PNG.

mod renderer;
mod skia_impl;
mod text;

pub use renderer::{RasterError, RenderResult};
pub use skia_impl::{TinySkiaRasterizer, pixel_rgba};
pub use text::FontSet;
