//! Local adapters for monolith deployment.

pub mod fs;

#[cfg(feature = "redis")]
pub mod redis;

pub use fs::FsPublisher;

#[cfg(feature = "redis")]
pub use redis::RedisPool;
