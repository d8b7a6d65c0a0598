//! Redis VideoRepository implementation.

use super::error::RedisStoreError;
use super::pool::RedisPool;
use super::{video_key, VIDEO_RECORD_PREFIX};
use crate::domain::video::VideoRecord;
use crate::error::RepositoryError;
use crate::ports::repository::VideoRepository;
use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use std::collections::HashSet;
use uuid::Uuid;

#[async_trait]
impl VideoRepository for RedisPool {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(RedisStoreError::from)?;
        let json: Option<String> = conn
            .get(video_key(id))
            .await
            .map_err(RedisStoreError::from)?;
        match json {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn update_video(&self, record: &VideoRecord) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(RedisStoreError::from)?;
        let json = serde_json::to_string(record)?;
        conn.set::<_, _, ()>(video_key(record.id), json)
            .await
            .map_err(RedisStoreError::from)?;
        Ok(())
    }

    async fn video_urls(&self) -> Result<HashSet<String>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(RedisStoreError::from)?;
        let keys: Vec<String> = conn
            .keys(format!("{VIDEO_RECORD_PREFIX}*"))
            .await
            .map_err(RedisStoreError::from)?;
        if keys.is_empty() {
            return Ok(HashSet::new());
        }

        let values: Vec<Option<String>> = deadpool_redis::redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;

        let mut urls = HashSet::new();
        for data in values.into_iter().flatten() {
            let record: VideoRecord = serde_json::from_str(&data)?;
            urls.extend(record.video_url);
        }
        Ok(urls)
    }
}
