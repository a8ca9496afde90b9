use anyhow::{Context, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;

use super::{image_key_for, is_safe_key};
use crate::application::ports::image_store::{ImageStore, ImageUpload};
use crate::application::validation::image::image_content_type;
use crate::bootstrap::config::Config;
use crate::domain::listings::listing::ImageRef;

pub struct S3ImageStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ImageStore {
    pub async fn new(cfg: &Config) -> anyhow::Result<Self> {
        let bucket = cfg
            .s3_bucket
            .clone()
            .context("S3 bucket must be configured when using S3 storage backend")?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &cfg.s3_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);

        if let (Some(access), Some(secret)) = (&cfg.s3_access_key, &cfg.s3_secret_key) {
            builder = builder.credentials_provider(Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                "wanderlust-s3-static",
            ));
        }
        if let Some(endpoint) = &cfg.s3_endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if cfg.s3_use_path_style {
            builder = builder.force_path_style(true);
        }

        let public_base_url = match (&cfg.s3_public_url, &cfg.s3_endpoint) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            (None, None) => format!("https://{bucket}.s3.amazonaws.com"),
        };

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket,
            public_base_url,
        })
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn store(&self, upload: &ImageUpload) -> anyhow::Result<ImageRef> {
        let key = image_key_for(upload);
        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(upload.bytes.clone()));
        if let Some(ct) = image_content_type(upload) {
            req = req.content_type(ct);
        }
        req.send()
            .await
            .map_err(|e| anyhow!(e.to_string()))
            .with_context(|| format!("failed to upload object {key}"))?;
        Ok(ImageRef {
            url: format!("{}/{}", self.public_base_url, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        if !is_safe_key(key) {
            anyhow::bail!("refusing to delete object outside the image prefix: {key}");
        }
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow!(e.to_string()))
            .with_context(|| format!("failed to delete object {key}"))?;
        Ok(())
    }
}
