// Filesystem side of the sync - the directory tree of dashboard files
use crate::application::sync_error::{io_err, SyncError};
use crate::domain::dashboard::{Dashboard, DASHBOARD_EXTENSION};
use crate::domain::dashboard_set::DashboardSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Outcome of writing a single dashboard file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, filename: &Path) -> PathBuf {
        self.root.join(filename)
    }

    /// Walk the root and parse every dashboard file into a set.
    /// Hidden entries and files without a `.json` extension are ignored.
    pub async fn list_dashboards(&self) -> Result<DashboardSet, SyncError> {
        let mut dashboards = DashboardSet::new();

        for path in self.dashboard_paths()? {
            let dashboard = self.read_identity(&path).await?;
            if let Some(previous) = dashboards.add(dashboard) {
                tracing::warn!(
                    "Dashboard uid {} appears in more than one file, ignoring {}",
                    previous.uid,
                    previous.filename.display()
                );
            }
        }

        tracing::debug!("Found {} local dashboards under {}", dashboards.len(), self.root.display());
        Ok(dashboards)
    }

    fn dashboard_paths(&self) -> Result<Vec<PathBuf>, SyncError> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| SyncError::Walk {
                root: self.root.clone(),
                source,
            })?;
            if entry.file_type().is_file() && is_dashboard_file(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }

    async fn read_identity(&self, path: &Path) -> Result<Dashboard, SyncError> {
        let relative = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf());
        let contents = tokio::fs::read(path).await.map_err(|e| io_err(path, e))?;

        Dashboard::local(relative, &contents).map_err(|source| SyncError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Raw bytes of a dashboard file, unmodified
    pub async fn read(&self, filename: &Path) -> Result<Vec<u8>, SyncError> {
        let path = self.path_of(filename);
        tokio::fs::read(&path).await.map_err(|e| io_err(path, e))
    }

    /// Write a dashboard file, creating parent directories as needed.
    /// Content goes to a temporary sibling first and is renamed into place.
    pub async fn write(&self, filename: &Path, contents: &[u8]) -> Result<WriteOutcome, SyncError> {
        let path = self.path_of(filename);

        match tokio::fs::read(&path).await {
            Ok(existing) if existing == contents => return Ok(WriteOutcome::Unchanged),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(path, e)),
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(parent, e))?;
        }

        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(path, e));
        }

        Ok(WriteOutcome::Written)
    }

    pub async fn remove(&self, filename: &Path) -> Result<(), SyncError> {
        let path = self.path_of(filename);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| io_err(path, e))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_dashboard_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == DASHBOARD_EXTENSION)
        .unwrap_or(false)
}
