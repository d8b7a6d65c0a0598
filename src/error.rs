//! Error types shared by ports, adapters and services.

use crate::domain::pipeline::Stage;
use crate::domain::video::PublishedReference;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the probe/remux toolkit.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("probe failed: {0}")]
    Probe(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("remux failed: {0}")]
    Remux(String),

    #[error("remux produced an empty file")]
    EmptyOutput,
}

/// Object store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Metadata store errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Metadata backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("upload body interrupted: {0}")]
    Body(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cause of a failed ingest run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("probe failed: {0}")]
    Probe(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("remux failed: {0}")]
    Remux(String),

    #[error("remux produced an empty file")]
    EmptyOutput,

    #[error("publish failed: {0}")]
    Publish(#[from] StorageError),

    /// The object is stored at `reference` but the record was not updated.
    #[error("commit of {reference} failed: {source}")]
    Commit {
        reference: PublishedReference,
        #[source]
        source: RepositoryError,
    },

    #[error("invalid transition {from} -> {to}")]
    InvalidTransition { from: Stage, to: Stage },
}

impl IngestError {
    /// Stable label for logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Validation(_) => "validation_failure",
            IngestError::Staging(_) => "staging_failure",
            IngestError::Probe(_) => "probe_failure",
            IngestError::NoVideoStream => "no_video_stream",
            IngestError::Remux(_) => "remux_failure",
            IngestError::EmptyOutput => "empty_output",
            IngestError::Publish(_) => "publish_failure",
            IngestError::Commit { .. } => "commit_failure",
            IngestError::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

impl From<MediaError> for IngestError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Probe(msg) => IngestError::Probe(msg),
            MediaError::NoVideoStream => IngestError::NoVideoStream,
            MediaError::Remux(msg) => IngestError::Remux(msg),
            MediaError::EmptyOutput => IngestError::EmptyOutput,
        }
    }
}

/// `Failed(stage, cause)`: terminal state of an aborted run.
#[derive(Debug, Error)]
#[error("ingest of video {video_id} failed after {stage}: {cause}")]
pub struct IngestFailure {
    pub video_id: Uuid,
    /// Last stage reached before the failure
    pub stage: Stage,
    #[source]
    pub cause: IngestError,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("listing stored objects failed: {0}")]
    Storage(#[from] StorageError),

    #[error("reading published references failed: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_errors_map_onto_ingest_taxonomy() {
        assert!(matches!(
            IngestError::from(MediaError::Probe("boom".into())),
            IngestError::Probe(_)
        ));
        assert!(matches!(
            IngestError::from(MediaError::NoVideoStream),
            IngestError::NoVideoStream
        ));
        assert!(matches!(
            IngestError::from(MediaError::Remux("boom".into())),
            IngestError::Remux(_)
        ));
        assert!(matches!(
            IngestError::from(MediaError::EmptyOutput),
            IngestError::EmptyOutput
        ));
    }

    #[test]
    fn test_failure_message_names_stage_and_cause() {
        let failure = IngestFailure {
            video_id: Uuid::nil(),
            stage: Stage::Remuxed,
            cause: IngestError::Publish(StorageError::UploadFailed("503".into())),
        };
        let message = failure.to_string();
        assert!(message.contains("after remuxed"));
        assert!(message.contains("503"));
        assert_eq!(failure.cause.kind(), "publish_failure");
    }
}
