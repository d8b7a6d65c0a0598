//! Configuration loaded from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Hard ceiling on a staged upload (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1 << 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// External probe/remux binaries.
#[derive(Clone, Debug)]
pub struct ToolConfig {
    pub ffprobe_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub probe_timeout: Duration,
    pub remux_timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: PathBuf::from("ffprobe"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            probe_timeout: Duration::from_secs(30),
            remux_timeout: Duration::from_secs(300),
        }
    }
}

/// Orchestrator settings.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Where staged and remuxed files live
    pub temp_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub publish_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            temp_dir: env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            publish_timeout: Duration::from_secs(600),
        }
    }
}

/// Where published videos go.
#[derive(Clone, Debug, PartialEq)]
pub enum StorageConfig {
    /// Files under `assets_root`, served at `<base_url>/assets/<key>`
    Local { assets_root: PathBuf, base_url: String },
    S3 {
        bucket: String,
        region: String,
        /// CloudFront distribution domain; direct bucket URLs when unset
        cf_distribution: Option<String>,
    },
}

impl StorageConfig {
    /// Base every published reference starts with.
    pub fn public_base_url(&self) -> String {
        match self {
            StorageConfig::Local { base_url, .. } => {
                format!("{}/assets", base_url.trim_end_matches('/'))
            }
            StorageConfig::S3 {
                cf_distribution: Some(distribution),
                ..
            } => format!("https://{}", distribution.trim_end_matches('/')),
            StorageConfig::S3 { bucket, region, .. } => {
                format!("https://{bucket}.s3.{region}.amazonaws.com")
            }
        }
    }
}

/// Configuration for the monolith deployment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Redis connection URL (video metadata)
    pub redis_url: String,
    pub tools: ToolConfig,
    pub ingest: IngestConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = parse_or(&var, "PORT", 8091u16)?;

        let tool_defaults = ToolConfig::default();
        let tools = ToolConfig {
            ffprobe_path: var("FFPROBE_PATH")
                .map(PathBuf::from)
                .unwrap_or(tool_defaults.ffprobe_path),
            ffmpeg_path: var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(tool_defaults.ffmpeg_path),
            probe_timeout: secs_or(&var, "PROBE_TIMEOUT_SECS", tool_defaults.probe_timeout)?,
            remux_timeout: secs_or(&var, "REMUX_TIMEOUT_SECS", tool_defaults.remux_timeout)?,
        };

        let ingest_defaults = IngestConfig::default();
        let ingest = IngestConfig {
            temp_dir: var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(ingest_defaults.temp_dir),
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", ingest_defaults.max_upload_bytes)?,
            publish_timeout: secs_or(
                &var,
                "PUBLISH_TIMEOUT_SECS",
                ingest_defaults.publish_timeout,
            )?,
        };

        let backend = var("STORAGE_BACKEND").unwrap_or_else(|| String::from("local"));
        let storage = match backend.as_str() {
            "local" => StorageConfig::Local {
                assets_root: var("ASSETS_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./assets")),
                base_url: var("ASSETS_BASE_URL")
                    .unwrap_or_else(|| format!("http://localhost:{port}")),
            },
            "s3" => StorageConfig::S3 {
                bucket: var("S3_BUCKET").ok_or(ConfigError::Missing("S3_BUCKET"))?,
                region: var("S3_REGION").unwrap_or_else(|| String::from("us-east-1")),
                cf_distribution: var("S3_CF_DISTRIBUTION"),
            },
            _ => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: backend,
                })
            }
        };

        Ok(Self {
            addr: var("ADDR").unwrap_or_else(|| String::from("127.0.0.1")),
            port,
            jwt_secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            redis_url: var("REDIS_URL").unwrap_or_else(|| String::from("redis://127.0.0.1/")),
            tools,
            ingest,
            storage,
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn secs_or<F>(var: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(var, name, default.as_secs()).map(Duration::from_secs)
}
