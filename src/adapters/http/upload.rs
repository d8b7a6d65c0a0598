use super::error::ApiError;
use super::AppState;
use crate::application::ingest::UploadRequest;
use crate::domain::video::VideoRecord;
use crate::ports::{media::MediaToolkit, repository::VideoRepository, storage::ObjectPublisher};
use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use uuid::Uuid;

/// Multipart field carrying the video bytes.
const VIDEO_FIELD: &str = "video";

// Handler that streams the `video` field of a multipart form into the ingest pipeline.
pub(super) async fn upload_video<M, P, R>(
    State(state): State<AppState<M, P, R>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, ApiError>
where
    M: MediaToolkit,
    P: ObjectPublisher,
    R: VideoRepository,
{
    let user_id = state.jwt.authorize(&headers)?;
    let video_id = Uuid::parse_str(&video_id)
        .map_err(|_| ApiError::BadRequest(format!("invalid video id {video_id:?}")))?;

    let record = state
        .ingest
        .repository()
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("video {video_id}")))?;
    if record.user_id != user_id {
        tracing::warn!(%video_id, %user_id, "upload rejected: not the owner");
        return Err(ApiError::Unauthorized(String::from("not the owner of this video")));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let media_type = field.content_type().unwrap_or_default().to_string();
        let max_bytes = state.ingest.config().max_upload_bytes;
        let receipt = state
            .ingest
            .ingest(record, UploadRequest::new(field, media_type, max_bytes))
            .await?;
        return Ok(Json(receipt.record));
    }

    Err(ApiError::BadRequest(format!(
        "multipart field {VIDEO_FIELD:?} is required"
    )))
}
