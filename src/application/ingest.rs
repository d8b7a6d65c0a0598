use super::media;
use super::staging::stage;
use crate::config::IngestConfig;
use crate::domain::av::aspect::AspectClass;
use crate::domain::key::{derive_key, ObjectKey};
use crate::domain::media_type::MediaType;
use crate::domain::pipeline::{IngestRun, Stage};
use crate::domain::video::{PublishedReference, VideoRecord};
use crate::error::{IngestError, IngestFailure, StorageError};
use crate::ports::media::MediaToolkit;
use crate::ports::repository::VideoRepository;
use crate::ports::storage::ObjectPublisher;
use axum::body::Bytes;
use axum::BoxError;
use futures::Stream;

/// An upload as handed over by the intake boundary.
pub struct UploadRequest<S> {
    pub body: S,
    /// Declared `Content-Type`, unvalidated
    pub media_type: String,
    /// Per-request byte limit, capped by [`IngestConfig::max_upload_bytes`]
    pub max_bytes: u64,
}

impl<S> UploadRequest<S> {
    pub fn new(body: S, media_type: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            body,
            media_type: media_type.into(),
            max_bytes,
        }
    }
}

/// Outcome of a committed run.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub record: VideoRecord,
    pub key: ObjectKey,
    pub aspect: AspectClass,
    pub reference: PublishedReference,
    pub staged_bytes: u64,
    pub published_bytes: u64,
}

/// Runs uploads through `stage -> classify -> remux -> publish -> commit`.
///
/// Runs share nothing but the collaborators, so any number may execute
/// concurrently. No stage is retried here.
pub struct IngestService<M, P, R> {
    toolkit: M,
    publisher: P,
    repo: R,
    config: IngestConfig,
}

impl<M, P, R> IngestService<M, P, R>
where
    M: MediaToolkit,
    P: ObjectPublisher,
    R: VideoRepository,
{
    pub fn new(toolkit: M, publisher: P, repo: R, config: IngestConfig) -> Self {
        Self {
            toolkit,
            publisher,
            repo,
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Ingest the video file for `record`.
    ///
    /// Ownership of `record` must already be checked. Temporary files are gone
    /// when this returns, whatever the outcome, and when the future is dropped.
    pub async fn ingest<S, E>(
        &self,
        record: VideoRecord,
        upload: UploadRequest<S>,
    ) -> Result<IngestReceipt, IngestFailure>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let mut run = IngestRun::new(record.id);

        match self.drive(&mut run, record, upload).await {
            Ok(receipt) => {
                tracing::info!(
                    video_id = %receipt.record.id,
                    key = %receipt.key,
                    reference = %receipt.reference,
                    bytes = receipt.published_bytes,
                    "video ingested"
                );
                Ok(receipt)
            }
            Err(cause) => {
                let failure = run.fail(cause);
                match &failure.cause {
                    IngestError::Commit { reference, source } => tracing::error!(
                        video_id = %failure.video_id,
                        reference = %reference,
                        error = %source,
                        "object stored but metadata not updated; left for reconciliation"
                    ),
                    cause => tracing::warn!(
                        video_id = %failure.video_id,
                        stage = %failure.stage,
                        kind = cause.kind(),
                        error = %cause,
                        "ingest failed"
                    ),
                }
                Err(failure)
            }
        }
    }

    async fn drive<S, E>(
        &self,
        run: &mut IngestRun,
        mut record: VideoRecord,
        upload: UploadRequest<S>,
    ) -> Result<IngestReceipt, IngestError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let media_type =
            MediaType::parse_upload(&upload.media_type).map_err(IngestError::Validation)?;

        let limit = upload.max_bytes.min(self.config.max_upload_bytes);
        let staged = stage(&self.config.temp_dir, upload.body, limit).await?;
        run.advance(Stage::Staged)?;

        let aspect = media::inspect(&self.toolkit, staged.path()).await?;
        run.advance(Stage::Classified)?;

        let key = derive_key(media_type.as_str(), aspect);

        let remuxed = media::remux(&self.toolkit, &staged).await?;
        run.advance(Stage::Remuxed)?;

        let timeout = self.config.publish_timeout;
        let reference = tokio::time::timeout(
            timeout,
            self.publisher
                .publish(remuxed.path(), &key.path(), media_type.as_str()),
        )
        .await
        .map_err(|_| StorageError::Timeout(timeout))??;
        run.advance(Stage::Published)?;

        record.video_url = Some(reference.to_string());
        if let Err(source) = self.repo.update_video(&record).await {
            return Err(IngestError::Commit { reference, source });
        }
        run.advance(Stage::Committed)?;

        Ok(IngestReceipt {
            record,
            key,
            aspect,
            reference,
            staged_bytes: staged.len(),
            published_bytes: remuxed.len(),
        })
    }
}
