use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use super::{image_key_for, is_safe_key};
use crate::application::ports::image_store::{ImageStore, ImageUpload};
use crate::domain::listings::listing::ImageRef;

/// Writes images under `root` and serves them from `public_prefix`
/// (mounted as a static directory by the HTTP layer).
pub struct FsImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, upload: &ImageUpload) -> anyhow::Result<ImageRef> {
        let key = image_key_for(upload);
        let path = self.root.join(&key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create upload dir {}", dir.display()))?;
        }
        fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("write image {}", path.display()))?;
        Ok(ImageRef {
            url: format!("{}/{}", self.public_prefix, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        if !is_safe_key(key) {
            anyhow::bail!("refusing to delete image outside the upload root: {key}");
        }
        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_releases_files_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path(), "/uploads/");
        let upload = ImageUpload {
            filename: Some("room.png".into()),
            content_type: Some("image/png".into()),
            bytes: b"\x89PNG".to_vec(),
        };

        let image = store.store(&upload).await.unwrap();
        assert_eq!(image.url, format!("/uploads/{}", image.key));
        let on_disk = dir.path().join(&image.key);
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"\x89PNG");

        store.delete(&image.key).await.unwrap();
        assert!(!on_disk.exists());
        // already gone is fine
        store.delete(&image.key).await.unwrap();
        assert!(store.delete("../outside.png").await.is_err());
    }
}
