//! Clipstash - Video Ingestion Library
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (keys, media types, stream classification, pipeline stages)
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations
//! - application/: Services built on ports (staging, ingest, reconcile)
//! - config: Environment configuration
//!
//! An upload goes through `validate -> stage -> probe/classify -> derive key ->
//! remux (faststart) -> publish -> commit`, see [`application::ingest::IngestService`].
//!
//! # Features
//! - `aws`: S3 object publisher
//! - `redis`: Redis-backed video metadata repository
//! - `native`: in-process ffmpeg toolkit (links libav* through `ffmpeg-next`)
//! - `full`: All features

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::ingest::{IngestReceipt, IngestService, UploadRequest};
pub use config::AppConfig;
pub use domain::av::aspect::AspectClass;
pub use domain::key::ObjectKey;
pub use domain::pipeline::Stage;
pub use error::{IngestError, IngestFailure};
