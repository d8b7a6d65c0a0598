//! Redis adapter for local deployment.
//!
//! Video records are stored as JSON strings under `clipstash:video:<id>`.

mod error;
mod pool;
mod repository;

pub use error::RedisStoreError;
pub use pool::RedisPool;

/// Redis key constants
const VIDEO_RECORD_PREFIX: &str = "clipstash:video:";

fn video_key(id: uuid::Uuid) -> String {
    format!("{VIDEO_RECORD_PREFIX}{id}")
}
