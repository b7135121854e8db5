// Folder resolution - maps a folder title to a Grafana folder id, creating it when missing
use crate::application::grafana_repository::{
    CreateFolderError, Folder, GENERAL_FOLDER_ID, GrafanaRepository,
};
use crate::application::sync_error::SyncError;
use std::collections::HashMap;

/// Resolves folder titles for the duration of a single push cycle.
/// Resolved ids are remembered so each folder is looked up once per cycle.
pub struct FolderResolver<'a> {
    repository: &'a dyn GrafanaRepository,
    resolved: HashMap<String, i64>,
}

impl<'a> FolderResolver<'a> {
    pub fn new(repository: &'a dyn GrafanaRepository) -> Self {
        Self {
            repository,
            resolved: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, folder_title: &str) -> Result<i64, SyncError> {
        if folder_title.is_empty() {
            return Ok(GENERAL_FOLDER_ID);
        }
        if let Some(id) = self.resolved.get(folder_title) {
            return Ok(*id);
        }

        let id = self.find_or_create(folder_title).await?;
        self.resolved.insert(folder_title.to_string(), id);
        Ok(id)
    }

    async fn find_or_create(&self, folder_title: &str) -> Result<i64, SyncError> {
        if let Some(folder) = self.find_exact(folder_title).await? {
            return Ok(folder.id);
        }

        tracing::info!("Creating folder {}", folder_title);
        match self.repository.create_folder(folder_title).await {
            Ok(folder) => Ok(folder.id),
            Err(CreateFolderError::AlreadyExists {
                existing: Some(folder),
            }) => {
                tracing::warn!("Folder {} already exists (id {})", folder_title, folder.id);
                Ok(folder.id)
            }
            Err(CreateFolderError::AlreadyExists { existing: None }) => {
                tracing::warn!("Folder {} already exists, looking it up again", folder_title);
                self.find_exact(folder_title)
                    .await?
                    .map(|folder| folder.id)
                    .ok_or_else(|| SyncError::FolderConflict {
                        title: folder_title.to_string(),
                    })
            }
            Err(CreateFolderError::Transport(e)) => Err(e.into()),
        }
    }

    /// The search API matches titles loosely, so filter for an exact title
    async fn find_exact(&self, folder_title: &str) -> Result<Option<Folder>, SyncError> {
        let candidates = self.repository.search_folders(folder_title).await?;
        tracing::debug!(
            "Folder search for {} returned {} candidates",
            folder_title,
            candidates.len()
        );
        Ok(candidates.into_iter().find(|f| f.title == folder_title))
    }
}
