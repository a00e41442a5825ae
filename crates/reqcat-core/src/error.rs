//! Error types shared by the reqcat crates.

use crate::document::DocumentId;
use crate::sort::CycleReport;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal errors: any of these voids the whole run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    CycleDetected(CycleReport),
    #[error("{dependent} requires {target}, which is not a discovered document")]
    MissingDependencyTarget {
        dependent: DocumentId,
        target: DocumentId,
    },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk {}: {message}", root.display())]
    Walk { root: PathBuf, message: String },
    #[error("invalid glob pattern {pattern:?}: {message}")]
    InvalidGlob { pattern: String, message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<CycleReport> for Error {
    fn from(report: CycleReport) -> Self {
        Self::CycleDetected(report)
    }
}
