use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;

#[async_trait]
pub trait StorageService: Send + Sync {
    fn bucket(&self) -> &str;
    async fn upload_file(&self, key: &str, source: &Path) -> Result<()>;
    async fn bucket_exists(&self) -> Result<bool>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload_file(&self, key: &str, source: &Path) -> Result<()> {
        let body = ByteStream::from_path(source).await?;

        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type("application/octet-stream")
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 put_object failed: source={}, dest={}/{}, error={:?}",
                source.display(),
                self.bucket,
                key,
                e
            );
            return Err(e.into());
        }

        tracing::info!(
            "File {} uploaded to {}/{}",
            source.display(),
            self.bucket,
            key
        );
        Ok(())
    }

    async fn bucket_exists(&self) -> Result<bool> {
        let res = self.client.head_bucket().bucket(&self.bucket).send().await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }
}
