//! Error types shared by every stage of the subtitle pipeline.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Everything that can go wrong while configuring or running a batch.
#[derive(Debug, Error)]
pub enum SubgenError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{tool} exited with {status}{detail}")]
    ToolExit {
        tool: String,
        status: ExitStatus,
        detail: String,
    },

    #[error("{tool} did not produce {}", path.display())]
    MissingOutput { tool: String, path: PathBuf },

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("filesystem error on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification used in logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    ExternalTool,
    Filesystem,
}

impl SubgenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubgenError::Configuration(_) => ErrorKind::Configuration,
            SubgenError::ToolExit { .. }
            | SubgenError::MissingOutput { .. }
            | SubgenError::Spawn { .. } => ErrorKind::ExternalTool,
            SubgenError::Filesystem { .. } => ErrorKind::Filesystem,
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SubgenError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for the pipeline.
pub type Result<T> = std::result::Result<T, SubgenError>;
