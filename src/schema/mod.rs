//! Schema module - session configuration and speed profiles.

mod config;
mod speed;

pub use config::*;
pub use speed::*;
