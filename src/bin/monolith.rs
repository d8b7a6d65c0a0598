//! Monolith Binary - single-server deployment
//!
//! Wires up:
//! - ffprobe/ffmpeg toolkit
//! - Object publisher (local assets directory or S3)
//! - Redis video metadata
//! - HTTP upload API

use clipstash::adapters::aws;
use clipstash::adapters::ffmpeg::FfmpegCli;
use clipstash::adapters::http::{router, AppState, JwtVerifier};
use clipstash::adapters::local::{FsPublisher, RedisPool};
use clipstash::application::ingest::IngestService;
use clipstash::config::{AppConfig, StorageConfig};
use clipstash::ports::storage::ObjectPublisher;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("clipstash=info,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.ingest.temp_dir).await {
        tracing::error!(dir = %config.ingest.temp_dir.display(), "Failed to create temp dir: {}", e);
        std::process::exit(1);
    }

    // 1. Adapters
    let repository = match RedisPool::new(&config.redis_url) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to Redis: {}", e);
            std::process::exit(1);
        }
    };

    let publisher: Arc<dyn ObjectPublisher> = match &config.storage {
        StorageConfig::Local { assets_root, .. } => {
            match FsPublisher::new(assets_root, &config.storage.public_base_url()) {
                Ok(publisher) => Arc::new(publisher),
                Err(e) => {
                    tracing::error!("Failed to prepare assets root: {}", e);
                    std::process::exit(1);
                }
            }
        }
        StorageConfig::S3 { bucket, region, .. } => Arc::new(
            aws::s3_publisher(bucket, region, config.storage.public_base_url()).await,
        ),
    };

    let toolkit = FfmpegCli::new(config.tools.clone());

    // 2. Application service
    let ingest = Arc::new(IngestService::new(
        toolkit,
        publisher,
        repository,
        config.ingest.clone(),
    ));

    // 3. HTTP layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = router(AppState {
        ingest,
        jwt: JwtVerifier::new(&config.jwt_secret),
    });
    if let StorageConfig::Local { assets_root, .. } = &config.storage {
        app = app.nest_service("/assets", ServeDir::new(assets_root));
    }
    let app = app.layer(cors).layer(TraceLayer::new_for_http());

    // 4. Start server
    let listener = match tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind TCP listener: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        storage = %config.storage.public_base_url(),
        "Listening at {}:{}",
        config.addr,
        config.port
    );
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
