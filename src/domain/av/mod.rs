//! Audio/Video domain modules.

pub mod aspect;
pub mod remux;
pub mod stream;
