//! Persistence contract for saved drawings, the public gallery and uploaded assets.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::{MemoryAssets, MemoryDrawingStore};

#[cfg(not(target_arch = "wasm32"))]
pub use file::DirectoryAssets;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Default gallery page size.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Default `drawing_name` for gallery uploads.
pub const DEFAULT_DRAWING_NAME: &str = "CustomWear";

/// Default `drawing_on` for gallery uploads.
pub const DEFAULT_DRAWING_ON: &str = "canvas";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid upload: {0}")]
    Validation(String),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async operations.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Boxed future for async operations (WASM version without Send).
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identifier issued by the external session provider.
    pub id: String,
    pub username: String,
    pub email: String,
    /// Saved drawings, oldest first.
    pub drawings: Vec<Uuid>,
}

/// Outcome of [`DrawingStore::register_user`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: UserRecord,
    /// False when the user already existed.
    pub created: bool,
}

/// A stored drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingRecord {
    pub id: Uuid,
    pub drawing_name: String,
    pub drawing_on: String,
    /// `data:<mime>;base64,<payload>`
    pub image_data: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry of a user's drawing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingSummary {
    pub id: Uuid,
    pub image_data: String,
}

impl From<&DrawingRecord> for DrawingSummary {
    fn from(record: &DrawingRecord) -> Self {
        Self {
            id: record.id,
            image_data: record.image_data.clone(),
        }
    }
}

/// Pagination block of a gallery response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

/// One page of the public gallery, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryPage {
    pub items: Vec<DrawingRecord>,
    pub pagination: Pagination,
}

impl GalleryPage {
    /// Slice `records` (already sorted newest first) into page `page` of `limit` items.
    ///
    /// Pages are 1-based; page 0 is treated as page 1.
    pub fn paginate(records: &[DrawingRecord], page: u32, limit: u32) -> Self {
        let page = page.max(1);
        let total_items = records.len() as u64;
        let total_pages = if limit == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(limit)) as u32
        };
        let skip = (page as usize - 1).saturating_mul(limit as usize);
        let items = records
            .iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect();
        Self {
            items,
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_items,
            },
        }
    }
}

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// PNG upload, as produced by frame export.
    pub fn png(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(file_name, "image/png", bytes)
    }

    /// Reject non-image content types, empty files and files over `max_bytes`.
    pub fn validate(&self, max_bytes: usize) -> StoreResult<()> {
        if !self.content_type.starts_with("image/") {
            return Err(StoreError::Validation(format!(
                "{} is not an image ({})",
                self.file_name, self.content_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(StoreError::Validation("no file uploaded".to_string()));
        }
        if self.bytes.len() > max_bytes {
            return Err(StoreError::Validation(format!(
                "{} is {} bytes, the limit is {} bytes",
                self.file_name,
                self.bytes.len(),
                max_bytes
            )));
        }
        Ok(())
    }

    /// Encode as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        use base64::{Engine, engine::general_purpose::STANDARD};
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Optional fields of a gallery upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignMetadata {
    pub drawing_name: Option<String>,
    pub drawing_on: Option<String>,
}

/// A stored clothing asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    /// Generated file name, `<unix-millis>-<original name>`.
    pub file_name: String,
    /// Path the editor loads the asset from.
    pub path: String,
}

impl StoredAsset {
    pub fn new(file_name: String) -> Self {
        let path = format!("Clothes/{file_name}");
        Self { file_name, path }
    }
}

/// Build the stored name for an uploaded asset.
///
/// Path separators are removed from the original name so the result is a
/// single path component.
pub fn generated_asset_name(original: &str, now: DateTime<Utc>) -> String {
    let base: String = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    let base = if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base
    };
    format!("{}-{}", now.timestamp_millis(), base)
}

/// Backend for raw asset bytes.
#[cfg(not(target_arch = "wasm32"))]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` under `file_name`.
    fn put(&self, file_name: &str, bytes: &[u8]) -> BoxFuture<'_, StoreResult<()>>;

    /// Read a previously stored asset.
    fn get(&self, file_name: &str) -> BoxFuture<'_, StoreResult<Vec<u8>>>;
}

/// Backend for raw asset bytes (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait AssetStore {
    fn put(&self, file_name: &str, bytes: &[u8]) -> BoxFuture<'_, StoreResult<()>>;

    fn get(&self, file_name: &str) -> BoxFuture<'_, StoreResult<Vec<u8>>>;
}

/// The persistence collaborator the editor relies on.
///
/// `user` is the identifier of the current session's user, `None` when signed out.
#[cfg(not(target_arch = "wasm32"))]
pub trait DrawingStore: Send + Sync {
    /// Register a user. Registering an existing id returns the stored record.
    fn register_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
    ) -> BoxFuture<'_, StoreResult<Registration>>;

    /// Save an exported drawing to the user's collection.
    fn save_drawing(
        &self,
        user: Option<&str>,
        upload: ImageUpload,
    ) -> BoxFuture<'_, StoreResult<DrawingRecord>>;

    /// The user's saved drawings, oldest first.
    fn list_drawings(&self, user: Option<&str>) -> BoxFuture<'_, StoreResult<Vec<DrawingSummary>>>;

    /// A page of the public gallery, newest first.
    fn fetch_page(&self, page: u32, limit: u32) -> BoxFuture<'_, StoreResult<GalleryPage>>;

    /// Publish a design to the public gallery.
    fn upload_design(
        &self,
        upload: ImageUpload,
        metadata: DesignMetadata,
    ) -> BoxFuture<'_, StoreResult<DrawingRecord>>;

    /// Store a clothing template and return its generated name.
    fn upload_asset(&self, upload: ImageUpload) -> BoxFuture<'_, StoreResult<StoredAsset>>;
}

/// The persistence collaborator (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait DrawingStore {
    fn register_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
    ) -> BoxFuture<'_, StoreResult<Registration>>;

    fn save_drawing(
        &self,
        user: Option<&str>,
        upload: ImageUpload,
    ) -> BoxFuture<'_, StoreResult<DrawingRecord>>;

    fn list_drawings(&self, user: Option<&str>) -> BoxFuture<'_, StoreResult<Vec<DrawingSummary>>>;

    fn fetch_page(&self, page: u32, limit: u32) -> BoxFuture<'_, StoreResult<GalleryPage>>;

    fn upload_design(
        &self,
        upload: ImageUpload,
        metadata: DesignMetadata,
    ) -> BoxFuture<'_, StoreResult<DrawingRecord>>;

    fn upload_asset(&self, upload: ImageUpload) -> BoxFuture<'_, StoreResult<StoredAsset>>;
}
