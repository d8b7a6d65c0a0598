//! Reconcile Binary - find (and optionally delete) published objects no video record references.

use clap::Parser;
use clipstash::adapters::aws;
use clipstash::adapters::local::{FsPublisher, RedisPool};
use clipstash::application::reconcile::ReconcileService;
use clipstash::config::{AppConfig, StorageConfig};
use clipstash::ports::storage::ObjectPublisher;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Sweep the object store for orphaned uploads")]
struct Args {
    /// Ignore objects younger than this many seconds
    #[arg(long, default_value_t = 24 * 60 * 60)]
    grace_secs: u64,

    /// Delete orphans instead of only reporting them
    #[arg(long)]
    delete: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipstash=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

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
                    tracing::error!("Failed to open assets root: {}", e);
                    std::process::exit(1);
                }
            }
        }
        StorageConfig::S3 { bucket, region, .. } => Arc::new(
            aws::s3_publisher(bucket, region, config.storage.public_base_url()).await,
        ),
    };

    let service = ReconcileService::new(publisher, repository);
    match service
        .sweep(Duration::from_secs(args.grace_secs), args.delete)
        .await
    {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("Failed to render report: {}", e),
        },
        Err(e) => {
            tracing::error!("Reconciliation failed: {}", e);
            std::process::exit(1);
        }
    }
}
