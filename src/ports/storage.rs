use crate::domain::video::PublishedReference;
use crate::error::StorageError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// An object as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// `None` when the backend cannot tell
    pub last_modified: Option<SystemTime>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectPublisher: Send + Sync {
    /// Upload a file from a local path under `key`.
    ///
    /// `Ok` means the bytes are retrievable at the returned reference.
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<PublishedReference, StorageError>;

    /// Reference a successful `publish` of `key` would return
    fn reference_for(&self, key: &str) -> PublishedReference;

    /// Every stored object
    async fn list(&self) -> Result<Vec<StoredObject>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: ObjectPublisher + ?Sized> ObjectPublisher for Arc<T> {
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<PublishedReference, StorageError> {
        (**self).publish(local_path, key, content_type).await
    }

    fn reference_for(&self, key: &str) -> PublishedReference {
        (**self).reference_for(key)
    }

    async fn list(&self) -> Result<Vec<StoredObject>, StorageError> {
        (**self).list().await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key).await
    }
}
