use crate::domain::av::stream::StreamProperties;
use crate::error::MediaError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Media inspection and container rewriting.
///
/// Each call runs to completion (or its timeout) before returning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Properties of the first video stream of `path`
    async fn probe(&self, path: &Path) -> Result<StreamProperties, MediaError>;

    /// Stream-copy `path` into a faststart MP4 at `<path>.processing` and return that path.
    ///
    /// The input is left untouched. The caller removes both files.
    async fn remux(&self, path: &Path) -> Result<PathBuf, MediaError>;
}

#[async_trait]
impl<T: MediaToolkit + ?Sized> MediaToolkit for Arc<T> {
    async fn probe(&self, path: &Path) -> Result<StreamProperties, MediaError> {
        (**self).probe(path).await
    }

    async fn remux(&self, path: &Path) -> Result<PathBuf, MediaError> {
        (**self).remux(path).await
    }
}
