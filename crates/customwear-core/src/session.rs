//! The editor session: single owner of the canvas and everything bound to it.

use crate::binder::{PropertyBinder, PropertyEdit, PropertyPanel};
use crate::canvas::Canvas;
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::events::{CanvasEvent, EventBus};
use crate::export::{DownloadSink, ExportManager, ExportReport, PendingExport, Rasterizer};
use crate::factory;
use crate::frames::{FrameInfo, FrameManager};
use crate::images::ImageSource;
use crate::settings::CanvasSettingsForm;
use crate::shapes::{ObjectId, Shape};
use crate::snap::{SnapOutcome, apply_snap};
use crate::storage::{
    DesignMetadata, DrawingRecord, DrawingStore, DrawingSummary, GalleryPage, ImageUpload,
    MAX_UPLOAD_BYTES, StoredAsset,
};
use crate::templates::find_template;
use kurbo::Point;
use std::sync::Arc;

/// Collaborators a session talks to.
pub struct SessionServices {
    pub images: Arc<dyn ImageSource>,
    pub store: Arc<dyn DrawingStore>,
    pub rasterizer: Box<dyn Rasterizer>,
    pub downloads: Box<dyn DownloadSink>,
}

/// One open editor.
///
/// Creating a session creates its canvas; dropping it detaches every
/// subscription and releases the canvas.
pub struct EditorSession {
    config: EditorConfig,
    canvas: Canvas,
    bus: EventBus,
    binder: PropertyBinder,
    frames: FrameManager,
    exports: ExportManager,
    settings: CanvasSettingsForm,
    services: SessionServices,
    user: Option<String>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, services: SessionServices) -> Self {
        let canvas = Canvas::new(
            config.canvas_width,
            config.canvas_height,
            config.background.clone(),
        );
        let bus = EventBus::new();
        let binder = PropertyBinder::attach(&bus);
        let frames = FrameManager::new(config.frame.clone());
        let settings = CanvasSettingsForm::from_canvas(&canvas);
        log::info!(
            "Editor session opened ({}x{})",
            config.canvas_width,
            config.canvas_height
        );
        Self {
            config,
            canvas,
            bus,
            binder,
            frames,
            exports: ExportManager::new(),
            settings,
            services,
            user: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The event bus, for additional observers.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn sign_in(&mut self, user_id: impl Into<String>) {
        self.user = Some(user_id.into());
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Deliver queued canvas events to subscribers.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while self.canvas.has_pending_events() {
            for event in self.canvas.take_events() {
                delivered += self.bus.emit(&mut self.canvas, &event);
            }
        }
        delivered
    }

    /// Finish an interaction step: deliver events, then render.
    fn commit(&mut self) {
        self.pump();
        self.canvas.render();
    }

    fn add_object(&mut self, shape: Shape) -> ObjectId {
        let id = self.canvas.add(shape);
        self.commit();
        id
    }

    // Toolbar

    pub fn add_rectangle(&mut self) -> ObjectId {
        self.add_object(factory::default_rectangle().into())
    }

    pub fn add_circle(&mut self) -> ObjectId {
        self.add_object(factory::default_circle().into())
    }

    pub fn add_triangle(&mut self) -> ObjectId {
        self.add_object(factory::default_triangle().into())
    }

    pub fn add_line(&mut self) -> ObjectId {
        self.add_object(factory::default_line().into())
    }

    pub fn add_text(&mut self) -> ObjectId {
        self.add_object(factory::default_textbox().into())
    }

    /// Load an image and insert it once decoded.
    ///
    /// Nothing is inserted when loading fails.
    pub async fn add_image(&mut self, path: &str) -> EditorResult<ObjectId> {
        let image = factory::image(
            self.services.images.as_ref(),
            path,
            self.config.image_target_size,
        )
        .await
        .inspect_err(|e| log::error!("Failed to load image {}: {}", path, e))?;
        Ok(self.add_object(image.into()))
    }

    /// Insert a built-in clothing template.
    pub async fn add_template(&mut self, template_id: &str) -> EditorResult<ObjectId> {
        let template = find_template(template_id)
            .ok_or_else(|| EditorError::NotFound(format!("template {template_id}")))?;
        self.add_image(template.image_path).await
    }

    /// Load the configured starting template, if any.
    pub async fn load_initial_template(&mut self) -> EditorResult<Option<ObjectId>> {
        let Some(path) = self.config.initial_template.clone() else {
            return Ok(None);
        };
        self.add_image(&path).await.map(Some)
    }

    /// Store a user-supplied clothing image. Its path can be passed to [`Self::add_image`].
    pub async fn upload_template(&self, upload: ImageUpload) -> EditorResult<StoredAsset> {
        upload.validate(MAX_UPLOAD_BYTES)?;
        Ok(self.services.store.upload_asset(upload).await?)
    }

    // Selection

    pub fn select(&mut self, id: ObjectId) -> EditorResult<()> {
        self.canvas.set_active(id)?;
        self.commit();
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.canvas.discard_active();
        self.commit();
    }

    /// Select the topmost object under `point`, or clear the selection on background.
    pub fn click_at(&mut self, point: Point) -> Option<ObjectId> {
        match self.canvas.object_at(point, 2.0) {
            Some(id) if self.canvas.set_active(id).is_ok() => {
                self.commit();
                Some(id)
            }
            _ => {
                self.deselect();
                None
            }
        }
    }

    pub fn panel(&self) -> PropertyPanel {
        self.binder.panel()
    }

    pub fn apply_edit(&mut self, edit: PropertyEdit) -> EditorResult<()> {
        self.binder.apply(&mut self.canvas, edit)?;
        self.pump();
        Ok(())
    }

    pub fn delete_selected(&mut self) -> EditorResult<Shape> {
        let removed = self.binder.delete_selected(&mut self.canvas)?;
        self.frames.prune(&self.canvas);
        self.pump();
        Ok(removed)
    }

    // Transforms

    /// One drag tick: move the object's top-left to `position` and snap it.
    pub fn move_object(&mut self, id: ObjectId, position: Point) -> EditorResult<SnapOutcome> {
        self.canvas
            .get_mut(id)
            .ok_or(EditorError::UnknownObject(id))?
            .props_mut()
            .set_position(position);
        self.canvas.notify(CanvasEvent::ObjectMoving(id));
        let outcome = apply_snap(&mut self.canvas, id)?;
        self.commit();
        Ok(outcome)
    }

    /// One scaling tick.
    pub fn scale_object(&mut self, id: ObjectId, scale_x: f64, scale_y: f64) -> EditorResult<()> {
        if !(scale_x > 0.0 && scale_y > 0.0) {
            return Err(EditorError::Validation("scale must be positive".to_string()));
        }
        let props = self
            .canvas
            .get_mut(id)
            .ok_or(EditorError::UnknownObject(id))?
            .props_mut();
        props.scale_x = scale_x;
        props.scale_y = scale_y;
        self.canvas.notify(CanvasEvent::ObjectScaling(id));
        self.commit();
        Ok(())
    }

    /// End of a drag or scale gesture.
    pub fn finish_transform(&mut self, id: ObjectId) -> EditorResult<()> {
        if !self.canvas.contains(id) {
            return Err(EditorError::UnknownObject(id));
        }
        self.canvas.clear_guidelines();
        self.canvas.notify(CanvasEvent::ObjectModified(id));
        self.commit();
        Ok(())
    }

    // Canvas settings

    pub fn settings(&self) -> &CanvasSettingsForm {
        &self.settings
    }

    pub fn set_canvas_width(&mut self, input: &str) -> EditorResult<()> {
        self.settings.set_width(&mut self.canvas, input)?;
        self.canvas.render();
        Ok(())
    }

    pub fn set_canvas_height(&mut self, input: &str) -> EditorResult<()> {
        self.settings.set_height(&mut self.canvas, input)?;
        self.canvas.render();
        Ok(())
    }

    pub fn set_background(&mut self, input: &str) -> EditorResult<()> {
        self.settings.set_background(&mut self.canvas, input)?;
        self.canvas.render();
        Ok(())
    }

    // Frames

    pub fn add_frame(&mut self) -> ObjectId {
        let id = self.frames.add_frame(&mut self.canvas, &self.bus);
        self.pump();
        id
    }

    pub fn list_frames(&self) -> Vec<FrameInfo> {
        FrameManager::list_frames(&self.canvas)
    }

    pub fn select_frame(&mut self, name: &str) -> EditorResult<ObjectId> {
        let id = FrameManager::select_frame(&mut self.canvas, name)?;
        self.pump();
        Ok(id)
    }

    /// Rasterize and download a frame. The returned export still has to be submitted.
    ///
    /// While it is pending, exporting the same frame again fails with
    /// [`EditorError::ExportInProgress`].
    pub fn begin_export(&mut self, name: &str) -> EditorResult<PendingExport> {
        self.exports.export_frame(
            &mut self.canvas,
            name,
            self.services.rasterizer.as_ref(),
            self.services.downloads.as_ref(),
            Arc::clone(&self.services.store),
            self.user.clone(),
        )
    }

    /// Export a frame and submit it to the signed-in user's collection.
    pub async fn export_frame(&mut self, name: &str) -> EditorResult<ExportReport> {
        let pending = self.begin_export(name)?;
        Ok(pending.submit().await)
    }

    // Gallery

    pub async fn fetch_gallery(&self, page: u32, limit: u32) -> EditorResult<GalleryPage> {
        Ok(self.services.store.fetch_page(page, limit).await?)
    }

    pub async fn my_drawings(&self) -> EditorResult<Vec<DrawingSummary>> {
        Ok(self.services.store.list_drawings(self.user.as_deref()).await?)
    }

    /// Publish an image to the public gallery.
    pub async fn publish_design(
        &self,
        upload: ImageUpload,
        metadata: DesignMetadata,
    ) -> EditorResult<DrawingRecord> {
        upload.validate(MAX_UPLOAD_BYTES)?;
        Ok(self.services.store.upload_design(upload, metadata).await?)
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.bus.clear();
        log::info!("Editor session closed ({} objects released)", self.canvas.len());
    }
}
