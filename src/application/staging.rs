//! Temporary files of a pipeline run.
//!
//! Every file is owned by a guard from the moment it is named, and the guard
//! removes it when dropped: on success, on error, and when the run is cancelled.

use crate::error::StagingError;
use axum::body::Bytes;
use axum::BoxError;
use futures::{Stream, TryStreamExt};
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;

pub const STAGING_PREFIX: &str = "clipstash-upload-";

/// Raw upload bytes on disk.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    len: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reserve `<staged path><suffix>`; whatever ends up there is removed with the guard.
    pub fn sibling(&self, suffix: &str) -> ScratchPath {
        let mut name = self.path().as_os_str().to_owned();
        name.push(suffix);
        ScratchPath::new(PathBuf::from(name))
    }
}

/// A path that may or may not exist yet, deleted on drop if it does.
#[derive(Debug)]
pub struct ScratchPath(TempPath);

impl ScratchPath {
    pub fn new(path: PathBuf) -> Self {
        Self(TempPath::from_path(path))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct BodyError(BoxError);

/// Save a `Stream` to a fresh temp file in `dir`, rewound to byte zero.
///
/// More than `limit` bytes aborts the copy with [`StagingError::TooLarge`].
pub async fn stage<S, E>(dir: &Path, body: S, limit: u64) -> Result<StagedFile, StagingError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let temp = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(".mp4")
        .tempfile_in(dir)?;
    let handle = tokio::fs::File::from_std(temp.as_file().try_clone()?);

    let body_with_io_error =
        body.map_err(|err| io::Error::new(io::ErrorKind::Other, BodyError(err.into())));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);
    let mut limited = body_reader.take(limit.saturating_add(1));

    let mut writer = BufWriter::new(handle);
    let copied = tokio::io::copy(&mut limited, &mut writer)
        .await
        .map_err(classify_copy_error)?;
    if copied > limit {
        return Err(StagingError::TooLarge { limit });
    }
    writer.flush().await?;

    // the clone shares the file offset with `temp`
    let mut handle = writer.into_inner();
    handle.seek(SeekFrom::Start(0)).await?;

    Ok(StagedFile {
        file: temp,
        len: copied,
    })
}

fn classify_copy_error(err: io::Error) -> StagingError {
    let is_body_error = err
        .get_ref()
        .map(|inner| inner.is::<BodyError>())
        .unwrap_or(false);

    if is_body_error {
        StagingError::Body(err.to_string())
    } else {
        StagingError::Io(err)
    }
}
