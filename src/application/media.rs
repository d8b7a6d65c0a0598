//! Stream inspection and remuxing on top of a [`MediaToolkit`].

use super::staging::{ScratchPath, StagedFile};
use crate::domain::av::aspect::AspectClass;
use crate::domain::av::remux::{verify_output, PROCESSING_SUFFIX};
use crate::error::MediaError;
use crate::ports::media::MediaToolkit;
use std::path::Path;

/// Classify the staged file by the geometry of its first video stream.
pub async fn inspect<M>(toolkit: &M, path: &Path) -> Result<AspectClass, MediaError>
where
    M: MediaToolkit + ?Sized,
{
    let properties = toolkit.probe(path).await?;
    let aspect = properties.aspect_class();

    tracing::debug!(
        path = %path.display(),
        width = properties.width(),
        height = properties.height(),
        aspect = %aspect,
        "classified video stream"
    );
    Ok(aspect)
}

/// Remuxed copy of a staged file. Removed on drop.
#[derive(Debug)]
pub struct RemuxedFile {
    output: ScratchPath,
    // set when the toolkit wrote somewhere other than the reserved sibling
    _reserved: Option<ScratchPath>,
    len: u64,
}

impl RemuxedFile {
    pub fn path(&self) -> &Path {
        self.output.path()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Remux the staged file and check the result is a non-empty file, whatever
/// the toolkit reported.
///
/// `<staged>.processing` is reserved before the toolkit runs, so a partial
/// output is removed even when the remux fails.
pub async fn remux<M>(toolkit: &M, staged: &StagedFile) -> Result<RemuxedFile, MediaError>
where
    M: MediaToolkit + ?Sized,
{
    let reserved = staged.sibling(PROCESSING_SUFFIX);
    let output = toolkit.remux(staged.path()).await?;

    let (output, reserved) = if output == reserved.path() {
        (reserved, None)
    } else {
        (ScratchPath::new(output), Some(reserved))
    };

    let len = verify_output(output.path()).await?;
    Ok(RemuxedFile {
        output,
        _reserved: reserved,
        len,
    })
}
