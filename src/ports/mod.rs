//! Ports - Trait definitions the application layer is written against.

pub mod media;
pub mod repository;
pub mod storage;
