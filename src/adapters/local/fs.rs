use crate::domain::av::aspect::AspectClass;
use crate::domain::video::PublishedReference;
use crate::error::StorageError;
use crate::ports::storage::{ObjectPublisher, StoredObject};
use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

const PARTIAL_PREFIX: &str = ".clipstash-";

/// Publishes into a directory served over HTTP under `/assets`.
#[derive(Clone, Debug)]
pub struct FsPublisher {
    root: PathBuf,
    /// `<base_url>/assets`
    public_base_url: String,
}

impl FsPublisher {
    /// Create the publisher, creating `root` if needed.
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(StorageError::IoError(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing key {key:?}"),
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectPublisher for FsPublisher {
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        _content_type: &str,
    ) -> Result<PublishedReference, StorageError> {
        let destination = self.path_for(key)?;
        let parent = destination.parent().unwrap_or(self.root.as_path());
        tokio::fs::create_dir_all(parent).await?;

        // deleted on drop unless persisted
        let partial = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .suffix(".partial")
            .tempfile_in(parent)?;
        let copied = async {
            let mut source = tokio::fs::File::open(local_path).await?;
            let mut target = tokio::fs::File::from_std(partial.as_file().try_clone()?);
            tokio::io::copy(&mut source, &mut target).await?;
            target.flush().await
        };
        if let Err(e) = copied.await {
            return Err(StorageError::UploadFailed(format!(
                "copying {} failed: {e}",
                local_path.display()
            )));
        }
        partial
            .persist(&destination)
            .map_err(|e| StorageError::IoError(e.error))?;

        Ok(self.reference_for(key))
    }

    fn reference_for(&self, key: &str) -> PublishedReference {
        PublishedReference::new(format!("{}/{}", self.public_base_url, key))
    }

    async fn list(&self) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        for aspect in AspectClass::ALL {
            let dir = self.root.join(aspect.as_str());
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::ListFailed(e.to_string())),
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }
                let metadata = entry.metadata().await?;
                if !metadata.is_file() {
                    continue;
                }
                objects.push(StoredObject {
                    key: format!("{aspect}/{name}"),
                    last_modified: metadata.modified().ok(),
                });
            }
        }
        Ok(objects)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }
}
