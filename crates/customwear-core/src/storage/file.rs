//! Directory-backed asset storage for native platforms.

use super::{AssetStore, BoxFuture, StoreError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores uploaded clothing templates as plain files in one directory.
pub struct DirectoryAssets {
    /// Base directory for asset files.
    base_path: PathBuf,
}

impl DirectoryAssets {
    /// Create an asset directory, creating it if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StoreResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StoreError::Io(format!("Failed to create asset directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Get the file path for an asset name.
    fn asset_path(&self, file_name: &str) -> StoreResult<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .filter(|name| name.to_str() == Some(file_name))
            .ok_or_else(|| StoreError::Validation(format!("invalid asset name: {file_name}")))?;
        Ok(self.base_path.join(name))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl AssetStore for DirectoryAssets {
    fn put(&self, file_name: &str, bytes: &[u8]) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.asset_path(file_name);
        let bytes = bytes.to_vec();
        Box::pin(async move {
            let path = path?;
            fs::write(&path, bytes).map_err(|e| {
                StoreError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }

    fn get(&self, file_name: &str) -> BoxFuture<'_, StoreResult<Vec<u8>>> {
        let path = self.asset_path(file_name);
        let file_name = file_name.to_string();
        Box::pin(async move {
            let path = path?;
            if !path.exists() {
                return Err(StoreError::NotFound(file_name));
            }
            fs::read(&path).map_err(|e| StoreError::Io(format!("Failed to read file: {}", e)))
        })
    }
}
