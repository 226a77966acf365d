//! Frame export: isolate a frame, rasterize its region, download and submit it.

use crate::canvas::Canvas;
use crate::error::{EditorError, EditorResult};
use crate::shapes::{Frame, ObjectId, Shape};
use crate::storage::{DrawingRecord, DrawingStore, ImageUpload};
use kurbo::Rect;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

/// An encoded raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// PNG bytes.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Turns a region of the canvas into a PNG.
pub trait Rasterizer {
    /// Rasterize `region` (canvas coordinates) of the canvas as currently visible.
    fn rasterize_region(&self, canvas: &Canvas, region: Rect) -> EditorResult<RasterImage>;
}

/// Receives files offered to the user for download.
pub trait DownloadSink {
    fn offer(&self, file_name: &str, bytes: &[u8]) -> EditorResult<()>;
}

/// Writes downloads into a directory.
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectoryDownloads {
    fn offer(&self, file_name: &str, bytes: &[u8]) -> EditorResult<()> {
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(self.dir.join(file_name), bytes))
            .map_err(|e| EditorError::Internal(format!("Failed to save {}: {}", file_name, e)))
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemoryDownloads {
    files: RefCell<Vec<(String, Vec<u8>)>>,
}

impl MemoryDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offered files, oldest first.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.borrow().clone()
    }
}

impl DownloadSink for MemoryDownloads {
    fn offer(&self, file_name: &str, bytes: &[u8]) -> EditorResult<()> {
        self.files
            .borrow_mut()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Export region of a frame: its position and scaled size.
pub fn frame_region(frame: &Frame) -> Rect {
    let props = &frame.props;
    Rect::from_origin_size(
        (props.left, props.top),
        (frame.width * props.scale_x, frame.height * props.scale_y),
    )
}

/// Hides every other frame and the target's border until dropped.
///
/// Dropping restores the border width and makes every frame visible again,
/// whether or not rasterization succeeded.
struct FrameIsolation<'a> {
    canvas: &'a mut Canvas,
    target: ObjectId,
    frames: Vec<ObjectId>,
}

impl<'a> FrameIsolation<'a> {
    fn new(canvas: &'a mut Canvas, target: ObjectId) -> Self {
        let frames: Vec<ObjectId> = canvas.frames().map(|f| f.id).collect();
        for id in &frames {
            if let Some(shape) = canvas.get_mut(*id) {
                shape.props_mut().visible = false;
            }
        }
        if let Some(shape) = canvas.get_mut(target) {
            let props = shape.props_mut();
            props.visible = true;
            props.stroke_width = 0.0;
        }
        Self {
            canvas,
            target,
            frames,
        }
    }

    fn canvas(&self) -> &Canvas {
        &*self.canvas
    }
}

impl Drop for FrameIsolation<'_> {
    fn drop(&mut self) {
        if let Some(shape) = self.canvas.get_mut(self.target) {
            shape.props_mut().stroke_width = Frame::STROKE_WIDTH;
        }
        for id in &self.frames {
            if let Some(shape) = self.canvas.get_mut(*id) {
                shape.props_mut().visible = true;
            }
        }
        self.canvas.render();
    }
}

/// Marks a frame as being exported until dropped.
struct InFlight {
    name: String,
    set: Rc<RefCell<HashSet<String>>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set.borrow_mut().remove(&self.name);
    }
}

/// Outcome of a frame export.
///
/// The local download and the remote submission are reported separately.
#[derive(Debug)]
pub struct ExportReport {
    pub frame: String,
    pub file_name: String,
    pub image: RasterImage,
    pub download: EditorResult<()>,
    pub submission: EditorResult<DrawingRecord>,
}

impl ExportReport {
    pub fn saved_locally(&self) -> bool {
        self.download.is_ok()
    }

    pub fn saved_to_account(&self) -> bool {
        self.submission.is_ok()
    }
}

/// A rasterized frame waiting to be submitted to the store.
///
/// The frame stays marked as in flight until this value is submitted or dropped.
pub struct PendingExport {
    frame: String,
    file_name: String,
    image: RasterImage,
    download: EditorResult<()>,
    store: Arc<dyn DrawingStore>,
    user: Option<String>,
    _in_flight: InFlight,
}

impl PendingExport {
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Submit the image to the user's collection.
    pub async fn submit(self) -> ExportReport {
        let upload = ImageUpload::png(self.file_name.clone(), self.image.png.clone());
        let submission = self
            .store
            .save_drawing(self.user.as_deref(), upload)
            .await
            .map_err(EditorError::from);
        match &submission {
            Ok(record) => log::info!("Saved {} as drawing {}", self.file_name, record.id),
            Err(e) => log::warn!("Submitting {} failed: {}", self.file_name, e),
        }
        ExportReport {
            frame: self.frame,
            file_name: self.file_name,
            image: self.image,
            download: self.download,
            submission,
        }
    }
}

/// Runs frame exports, at most one per frame at a time.
#[derive(Default)]
pub struct ExportManager {
    in_flight: Rc<RefCell<HashSet<String>>>,
}

impl ExportManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_exporting(&self, frame: &str) -> bool {
        self.in_flight.borrow().contains(frame)
    }

    /// Rasterize the named frame and offer it as `<frame>.png`.
    ///
    /// The canvas is restored before this returns. The returned
    /// [`PendingExport`] performs the remote submission.
    pub fn export_frame(
        &self,
        canvas: &mut Canvas,
        name: &str,
        rasterizer: &dyn Rasterizer,
        downloads: &dyn DownloadSink,
        store: Arc<dyn DrawingStore>,
        user: Option<String>,
    ) -> EditorResult<PendingExport> {
        let (target, region) = match canvas.objects().find(|s| s.name() == Some(name)) {
            Some(Shape::Frame(frame)) => (frame.id, frame_region(frame)),
            _ => return Err(EditorError::UnknownFrame(name.to_string())),
        };

        if !self.in_flight.borrow_mut().insert(name.to_string()) {
            return Err(EditorError::ExportInProgress(name.to_string()));
        }
        let in_flight = InFlight {
            name: name.to_string(),
            set: Rc::clone(&self.in_flight),
        };

        log::info!(
            "Exporting {} ({}x{} at {},{})",
            name,
            region.width(),
            region.height(),
            region.x0,
            region.y0
        );
        let image = {
            let isolation = FrameIsolation::new(canvas, target);
            rasterizer.rasterize_region(isolation.canvas(), region)?
        };

        let file_name = format!("{name}.png");
        let download = downloads.offer(&file_name, &image.png);
        if let Err(e) = &download {
            log::warn!("Download of {} failed: {}", file_name, e);
        }

        Ok(PendingExport {
            frame: name.to_string(),
            file_name,
            image,
            download,
            store,
            user,
            _in_flight: in_flight,
        })
    }
}
