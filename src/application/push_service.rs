// Push service - uploads the local tree to Grafana
use crate::application::folder_resolver::FolderResolver;
use crate::application::grafana_repository::GrafanaRepository;
use crate::application::sync_error::SyncError;
use crate::domain::validation::validate_dashboards;
use crate::infrastructure::local_store::LocalStore;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    pub uploaded: usize,
}

#[derive(Clone)]
pub struct PushService {
    repository: Arc<dyn GrafanaRepository>,
    store: LocalStore,
}

impl PushService {
    pub fn new(repository: Arc<dyn GrafanaRepository>, store: LocalStore) -> Self {
        Self { repository, store }
    }

    /// Upload every local dashboard into its folder, overwriting remote copies.
    /// Remote dashboards without a local file are left alone.
    pub async fn sync_local_to_remote(&self) -> Result<PushReport, SyncError> {
        let local = self.store.list_dashboards().await?;
        validate_dashboards(&local)?;

        let mut folders = FolderResolver::new(self.repository.as_ref());
        let mut report = PushReport::default();

        for dashboard in &local {
            let raw = self.store.read(&dashboard.filename).await?;
            let folder_id = folders.resolve(&dashboard.folder_title).await?;

            tracing::info!("Sending {} to Grafana instance", dashboard.filename.display());
            self.repository
                .save_raw_dashboard(&raw, folder_id, true)
                .await?;
            report.uploaded += 1;
        }

        Ok(report)
    }
}
