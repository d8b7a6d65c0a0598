//! HTTP inbound adapter: authenticated video upload.

pub mod auth;
pub mod error;
mod upload;

pub use auth::JwtVerifier;
pub use error::ApiError;

use crate::application::ingest::IngestService;
use crate::ports::{media::MediaToolkit, repository::VideoRepository, storage::ObjectPublisher};
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;

pub struct AppState<M, P, R> {
    pub ingest: Arc<IngestService<M, P, R>>,
    pub jwt: JwtVerifier,
}

impl<M, P, R> Clone for AppState<M, P, R> {
    fn clone(&self) -> Self {
        Self {
            ingest: self.ingest.clone(),
            jwt: self.jwt.clone(),
        }
    }
}

/// API routes. The upload size is enforced while staging, not by the body limit.
pub fn router<M, P, R>(state: AppState<M, P, R>) -> Router
where
    M: MediaToolkit + 'static,
    P: ObjectPublisher + 'static,
    R: VideoRepository + 'static,
{
    Router::new()
        .route("/api/videos/:video_id", post(upload::upload_video::<M, P, R>))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
