use crate::domain::video::VideoRecord;
use crate::error::RepositoryError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Get a video record
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, RepositoryError>;

    /// Persist a record, replacing the stored one
    async fn update_video(&self, record: &VideoRecord) -> Result<(), RepositoryError>;

    /// All `video_url` values currently set
    async fn video_urls(&self) -> Result<HashSet<String>, RepositoryError>;
}

#[async_trait]
impl<T: VideoRepository + ?Sized> VideoRepository for Arc<T> {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, RepositoryError> {
        (**self).get_video(id).await
    }

    async fn update_video(&self, record: &VideoRecord) -> Result<(), RepositoryError> {
        (**self).update_video(record).await
    }

    async fn video_urls(&self) -> Result<HashSet<String>, RepositoryError> {
        (**self).video_urls().await
    }
}
