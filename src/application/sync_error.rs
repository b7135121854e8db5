// Errors that abort a sync cycle
use crate::application::grafana_repository::GrafanaError;
use crate::domain::dashboard::{DashboardParseError, UnsafeFolderTitle};
use crate::domain::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("grafana: {0}")]
    Transport(#[from] GrafanaError),

    #[error("I/O error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse dashboard {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DashboardParseError,
    },

    #[error(transparent)]
    UnsafeFolder(#[from] UnsafeFolderTitle),

    #[error("invalid dashboard JSON for {uid}: {source}")]
    Json {
        uid: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("folder {title} reported as existing but could not be found")]
    FolderConflict { title: String },
}

/// Convenience constructor for [`SyncError::Filesystem`]
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Filesystem {
        path: path.into(),
        source,
    }
}
