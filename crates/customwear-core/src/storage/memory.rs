//! In-memory store implementation.

use super::{
    AssetStore, BoxFuture, DesignMetadata, DrawingRecord, DrawingStore, DrawingSummary,
    GalleryPage, ImageUpload, MAX_UPLOAD_BYTES, Registration, StoreError, StoreResult,
    StoredAsset, UserRecord, DEFAULT_DRAWING_NAME, DEFAULT_DRAWING_ON, generated_asset_name,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

fn lock_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Io(format!("Lock error: {}", e))
}

/// Asset bytes kept in memory.
#[derive(Default)]
pub struct MemoryAssets {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetStore for MemoryAssets {
    fn put(&self, file_name: &str, bytes: &[u8]) -> BoxFuture<'_, StoreResult<()>> {
        let file_name = file_name.to_string();
        let bytes = bytes.to_vec();
        Box::pin(async move {
            let mut files = self.files.write().map_err(lock_error)?;
            files.insert(file_name, bytes);
            Ok(())
        })
    }

    fn get(&self, file_name: &str) -> BoxFuture<'_, StoreResult<Vec<u8>>> {
        let file_name = file_name.to_string();
        Box::pin(async move {
            let files = self.files.read().map_err(lock_error)?;
            files
                .get(&file_name)
                .cloned()
                .ok_or(StoreError::NotFound(file_name))
        })
    }
}

/// In-memory drawing store for tests, local sessions and the development server.
pub struct MemoryDrawingStore {
    users: RwLock<HashMap<String, UserRecord>>,
    /// Drawings in insertion order.
    drawings: RwLock<Vec<DrawingRecord>>,
    assets: Box<dyn AssetStore>,
    max_upload_bytes: usize,
}

impl Default for MemoryDrawingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDrawingStore {
    /// Create an empty store with in-memory assets.
    pub fn new() -> Self {
        Self::with_assets(Box::new(MemoryAssets::new()))
    }

    /// Create an empty store writing assets to `assets`.
    pub fn with_assets(assets: Box<dyn AssetStore>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            drawings: RwLock::new(Vec::new()),
            assets,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn assets(&self) -> &dyn AssetStore {
        self.assets.as_ref()
    }

    fn insert_drawing(&self, record: DrawingRecord) -> StoreResult<()> {
        let mut drawings = self.drawings.write().map_err(lock_error)?;
        drawings.push(record);
        Ok(())
    }
}

impl DrawingStore for MemoryDrawingStore {
    fn register_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
    ) -> BoxFuture<'_, StoreResult<Registration>> {
        let id = id.to_string();
        let username = username.to_string();
        let email = email.to_string();
        Box::pin(async move {
            if id.trim().is_empty() {
                return Err(StoreError::Unauthenticated);
            }
            let mut users = self.users.write().map_err(lock_error)?;
            if let Some(existing) = users.get(&id) {
                return Ok(Registration {
                    user: existing.clone(),
                    created: false,
                });
            }
            log::info!("Creating user {} <{}>", id, email);
            let user = UserRecord {
                id: id.clone(),
                username,
                email,
                drawings: Vec::new(),
            };
            users.insert(id, user.clone());
            Ok(Registration {
                user,
                created: true,
            })
        })
    }

    fn save_drawing(
        &self,
        user: Option<&str>,
        upload: ImageUpload,
    ) -> BoxFuture<'_, StoreResult<DrawingRecord>> {
        let user = user.map(str::to_string);
        Box::pin(async move {
            let user = user.ok_or(StoreError::Unauthenticated)?;
            if !self.users.read().map_err(lock_error)?.contains_key(&user) {
                return Err(StoreError::NotFound(format!("user {user}")));
            }
            upload.validate(self.max_upload_bytes)?;

            let record = DrawingRecord {
                id: Uuid::new_v4(),
                drawing_name: DEFAULT_DRAWING_NAME.to_string(),
                drawing_on: DEFAULT_DRAWING_ON.to_string(),
                image_data: upload.to_data_url(),
                created_by: Some(user.clone()),
                created_at: Utc::now(),
            };
            self.insert_drawing(record.clone())?;

            let mut users = self.users.write().map_err(lock_error)?;
            let owner = users
                .get_mut(&user)
                .ok_or_else(|| StoreError::NotFound(format!("user {user}")))?;
            owner.drawings.push(record.id);
            log::debug!("Saved drawing {} for {}", record.id, user);
            Ok(record)
        })
    }

    fn list_drawings(&self, user: Option<&str>) -> BoxFuture<'_, StoreResult<Vec<DrawingSummary>>> {
        let user = user.map(str::to_string);
        Box::pin(async move {
            let user = user.ok_or(StoreError::Unauthenticated)?;
            let users = self.users.read().map_err(lock_error)?;
            let owner = users
                .get(&user)
                .ok_or_else(|| StoreError::NotFound(format!("user {user}")))?;
            let drawings = self.drawings.read().map_err(lock_error)?;
            Ok(owner
                .drawings
                .iter()
                .filter_map(|id| drawings.iter().find(|d| d.id == *id))
                .map(DrawingSummary::from)
                .collect())
        })
    }

    fn fetch_page(&self, page: u32, limit: u32) -> BoxFuture<'_, StoreResult<GalleryPage>> {
        Box::pin(async move {
            let drawings = self.drawings.read().map_err(lock_error)?;
            // Newest first; ties keep the later insertion first.
            let mut sorted: Vec<DrawingRecord> = drawings.iter().rev().cloned().collect();
            sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(GalleryPage::paginate(&sorted, page, limit))
        })
    }

    fn upload_design(
        &self,
        upload: ImageUpload,
        metadata: DesignMetadata,
    ) -> BoxFuture<'_, StoreResult<DrawingRecord>> {
        Box::pin(async move {
            upload.validate(self.max_upload_bytes)?;
            let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
            let record = DrawingRecord {
                id: Uuid::new_v4(),
                drawing_name: non_empty(metadata.drawing_name)
                    .unwrap_or_else(|| DEFAULT_DRAWING_NAME.to_string()),
                drawing_on: non_empty(metadata.drawing_on)
                    .unwrap_or_else(|| DEFAULT_DRAWING_ON.to_string()),
                image_data: upload.to_data_url(),
                created_by: None,
                created_at: Utc::now(),
            };
            self.insert_drawing(record.clone())?;
            Ok(record)
        })
    }

    fn upload_asset(&self, upload: ImageUpload) -> BoxFuture<'_, StoreResult<StoredAsset>> {
        Box::pin(async move {
            upload.validate(self.max_upload_bytes)?;
            let file_name = generated_asset_name(&upload.file_name, Utc::now());
            self.assets.put(&file_name, &upload.bytes).await?;
            log::info!("Stored asset {}", file_name);
            Ok(StoredAsset::new(file_name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    fn png() -> ImageUpload {
        ImageUpload::png("Frame 1.png", vec![0x89, 0x50, 0x4E, 0x47])
    }

    #[test]
    fn test_save_requires_session() {
        let store = MemoryDrawingStore::new();
        let result = block_on(store.save_drawing(None, png()));
        assert!(matches!(result, Err(StoreError::Unauthenticated)));
    }

    #[test]
    fn test_save_unknown_user_not_found() {
        let store = MemoryDrawingStore::new();
        let result = block_on(store.save_drawing(Some("ghost"), png()));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_save_appends_to_user() {
        let store = MemoryDrawingStore::new();
        let reg = block_on(store.register_user("u1", "Ada", "ada@example.com")).unwrap();
        assert!(reg.created);

        let saved = block_on(store.save_drawing(Some("u1"), png())).unwrap();
        assert_eq!(saved.created_by.as_deref(), Some("u1"));
        assert!(saved.image_data.starts_with("data:image/png;base64,"));

        let list = block_on(store.list_drawings(Some("u1"))).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, saved.id);
    }

    #[test]
    fn test_register_is_idempotent() {
        let store = MemoryDrawingStore::new();
        block_on(store.register_user("u1", "Ada", "ada@example.com")).unwrap();
        let again = block_on(store.register_user("u1", "Other", "other@example.com")).unwrap();
        assert!(!again.created);
        assert_eq!(again.user.username, "Ada");
    }

    #[test]
    fn test_gallery_newest_first() {
        let store = MemoryDrawingStore::new();
        for i in 0..25 {
            let meta = DesignMetadata {
                drawing_name: Some(format!("design {i}")),
                drawing_on: None,
            };
            block_on(store.upload_design(png(), meta)).unwrap();
        }
        let page = block_on(store.fetch_page(1, 12)).unwrap();
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.items[0].drawing_name, "design 24");
        assert_eq!(page.items[0].drawing_on, "canvas");

        let page = block_on(store.fetch_page(2, 12)).unwrap();
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.total_items, 25);
    }

    #[test]
    fn test_upload_design_rejects_non_image() {
        let store = MemoryDrawingStore::new();
        let upload = ImageUpload::new("a.txt", "text/plain", vec![1]);
        let result = block_on(store.upload_design(upload, DesignMetadata::default()));
        assert!(matches!(result, Err(StoreError::Validation(_))));
        let page = block_on(store.fetch_page(1, 12)).unwrap();
        assert_eq!(page.pagination.total_items, 0);
    }

    #[test]
    fn test_upload_asset_generates_name() {
        let store = MemoryDrawingStore::new();
        let upload = ImageUpload::new("hoodie.webp", "image/webp", vec![1, 2, 3]);
        let asset = block_on(store.upload_asset(upload)).unwrap();
        assert!(asset.file_name.ends_with("-hoodie.webp"));
        assert_eq!(asset.path, format!("Clothes/{}", asset.file_name));
        let bytes = block_on(store.assets().get(&asset.file_name)).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
