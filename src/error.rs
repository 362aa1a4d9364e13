use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the learning core and its checkpoint/score files.
///
/// Collisions, step-budget exhaustion and food respawn retries are game
/// outcomes and never show up here.
#[derive(Debug, Error)]
pub enum SnakeError {
    #[error("unknown action index {0}, expected 0, 1 or 2")]
    InvalidAction(usize),
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("checkpoint codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("score log error: {0}")]
    Csv(#[from] csv::Error),
    #[error("checkpoint holds {found} layers, expected {expected}")]
    LayerCount { expected: usize, found: usize },
    #[error("checkpoint layer {0} is not of the expected kind")]
    LayerKind(usize),
    #[error("checkpoint layer {layer} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        layer: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

impl SnakeError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SnakeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SnakeError>;
