//! Frame pipeline - two render passes over a bounded thread pool.

use std::path::PathBuf;

use crate::highlight::TokenizeError;
use crate::schema::ConfigError;

mod artifacts;
mod session;

pub use artifacts::*;
pub use session::*;

/// Pipeline failures.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("render pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("missing intermediate artifact {0:?}")]
    MissingArtifact(PathBuf),
}
