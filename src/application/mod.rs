//! Application layer - Generic services that use ports.

pub mod ingest;
pub mod media;
pub mod reconcile;
pub mod staging;
