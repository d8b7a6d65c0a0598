use crate::domain::av::aspect::AspectClass;
use crate::domain::video::PublishedReference;
use crate::error::StorageError;
use crate::ports::storage::{ObjectPublisher, StoredObject};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use std::time::SystemTime;

/// S3Publisher implements ObjectPublisher for AWS S3, optionally fronted by CloudFront.
#[derive(Clone)]
pub struct S3Publisher {
    client: Client,
    bucket: String,
    /// `https://<distribution>` or the bucket's virtual-hosted URL
    public_base_url: String,
}

impl S3Publisher {
    pub fn new(client: Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await
                .map_err(|e| StorageError::ListFailed(DisplayErrorContext(e).to_string()))?;

            for object in res.contents.unwrap_or_default() {
                if let Some(key) = object.key {
                    objects.push(StoredObject {
                        key,
                        last_modified: object
                            .last_modified
                            .and_then(|d| SystemTime::try_from(d).ok()),
                    });
                }
            }

            if res.is_truncated.unwrap_or(false) {
                continuation_token = res.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(objects)
    }
}

#[async_trait]
impl ObjectPublisher for S3Publisher {
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<PublishedReference, StorageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(DisplayErrorContext(e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key, "uploaded object");
        Ok(self.reference_for(key))
    }

    fn reference_for(&self, key: &str) -> PublishedReference {
        PublishedReference::new(format!("{}/{}", self.public_base_url, key))
    }

    async fn list(&self) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        for aspect in AspectClass::ALL {
            objects.extend(self.list_prefix(&format!("{aspect}/")).await?);
        }
        Ok(objects)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(DisplayErrorContext(e).to_string()))?;
        Ok(())
    }
}
