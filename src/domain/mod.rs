//! Domain layer - Pure business logic.

pub mod av;
pub mod key;
pub mod media_type;
pub mod pipeline;
pub mod video;
