//! CustomWear Core Library
//!
//! Platform-agnostic object model, scene graph and editing logic for the
//! CustomWear garment design editor.

pub mod binder;
pub mod canvas;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod factory;
pub mod frames;
pub mod images;
pub mod session;
pub mod settings;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod templates;

pub use binder::{PropertyBinder, PropertyEdit, PropertyPanel};
pub use canvas::Canvas;
pub use config::{EditorConfig, FrameDefaults};
pub use error::{EditorError, EditorResult, ErrorKind};
pub use events::{CanvasEvent, EventBus, Subscription, Topic};
pub use export::{
    DirectoryDownloads, DownloadSink, ExportManager, ExportReport, MemoryDownloads, PendingExport,
    RasterImage, Rasterizer,
};
pub use frames::{FrameInfo, FrameManager};
pub use images::{FsImageSource, ImageSource, MemoryImageSource};
pub use session::{EditorSession, SessionServices};
pub use settings::CanvasSettingsForm;
pub use shapes::{CssColor, ObjectId, Shape, ShapeKind};
pub use snap::{SNAP_THRESHOLD, SnapOutcome, apply_snap, compute_snap};
pub use storage::{DrawingStore, MemoryDrawingStore};
pub use templates::{CLOTHING_TEMPLATES, ClothingTemplate};
