use crate::position::Position;
use std::path::PathBuf;

/// Errors raised by the fallible edges of the engine: configuration and
/// position conversion. The math operations themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid environment name {0:?}")]
    InvalidEnvironment(String),

    #[error("position {0:?} does not exist in the document")]
    InvalidPosition(Position),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
