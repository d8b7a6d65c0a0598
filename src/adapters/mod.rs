//! Adapters - Concrete implementations of ports.

pub mod ffmpeg;
pub mod http;
pub mod local;

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(feature = "native")]
pub mod native;
