use async_trait::async_trait;

use crate::domain::listings::listing::ImageRef;

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, upload: &ImageUpload) -> anyhow::Result<ImageRef>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}
