// Pull service - mirrors remote dashboards into the local tree
use crate::application::grafana_repository::GrafanaRepository;
use crate::application::sync_error::SyncError;
use crate::domain::dashboard::Dashboard;
use crate::domain::dashboard_set::DashboardSet;
use crate::domain::validation::validate_dashboards;
use crate::infrastructure::dashboard_json::normalize_dashboard;
use crate::infrastructure::local_store::{LocalStore, WriteOutcome};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    pub written: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

#[derive(Clone)]
pub struct PullService {
    repository: Arc<dyn GrafanaRepository>,
    store: LocalStore,
}

impl PullService {
    pub fn new(repository: Arc<dyn GrafanaRepository>, store: LocalStore) -> Self {
        Self { repository, store }
    }

    /// Replace local files with the remote dashboards, then delete local
    /// files whose dashboards no longer exist remotely.
    /// Stops at the first failure; earlier writes are kept.
    pub async fn sync_remote_to_local(&self) -> Result<PullReport, SyncError> {
        let local = self.store.list_dashboards().await?;
        validate_dashboards(&local)?;

        let remote = self.list_remote_dashboards().await?;
        if remote.is_empty() && !local.is_empty() {
            tracing::warn!(
                "Grafana reported no dashboards, removing all {} local files",
                local.len()
            );
        }

        let mut report = PullReport::default();

        for dashboard in &remote {
            match self.pull_dashboard(dashboard).await? {
                WriteOutcome::Written => report.written += 1,
                WriteOutcome::Unchanged => report.unchanged += 1,
            }
        }

        // A path now owned by a remote dashboard was just rewritten, keep it
        let remote_paths: HashSet<&Path> = remote.iter().map(|d| d.filename.as_path()).collect();

        let orphans = local.difference(&remote);
        for orphan in &orphans {
            if remote_paths.contains(orphan.filename.as_path()) {
                continue;
            }
            tracing::info!(
                "Deleting {}, dashboard {} no longer exists",
                orphan.filename.display(),
                orphan.uid
            );
            self.store.remove(&orphan.filename).await?;
            report.deleted += 1;
        }

        for stale in relocated(&local, &remote) {
            if remote_paths.contains(stale.filename.as_path()) {
                continue;
            }
            tracing::info!(
                "Deleting {}, dashboard {} moved",
                stale.filename.display(),
                stale.uid
            );
            self.store.remove(&stale.filename).await?;
            report.deleted += 1;
        }

        Ok(report)
    }

    async fn list_remote_dashboards(&self) -> Result<DashboardSet, SyncError> {
        let summaries = self.repository.list_dashboards().await?;
        let dashboards = summaries
            .into_iter()
            .map(|s| Dashboard::remote(s.title, s.uid, s.folder_title, &s.url))
            .collect::<Result<DashboardSet, _>>()?;
        Ok(dashboards)
    }

    async fn pull_dashboard(&self, dashboard: &Dashboard) -> Result<WriteOutcome, SyncError> {
        let raw = self.repository.get_raw_dashboard(&dashboard.uid).await?;
        let contents = normalize_dashboard(&raw).map_err(|source| SyncError::Json {
            uid: dashboard.uid.clone(),
            source,
        })?;

        let outcome = self.store.write(&dashboard.filename, &contents).await?;
        match outcome {
            WriteOutcome::Written => tracing::info!(
                "Writing dashboard '{} / {}' to {}",
                dashboard.folder_title,
                dashboard.title,
                self.store.path_of(&dashboard.filename).display()
            ),
            WriteOutcome::Unchanged => {
                tracing::debug!("{} is up to date", dashboard.filename.display())
            }
        }
        Ok(outcome)
    }
}

/// Local files whose dashboard still exists remotely but under another path
fn relocated<'a>(
    local: &'a DashboardSet,
    remote: &'a DashboardSet,
) -> impl Iterator<Item = &'a Dashboard> {
    local.iter().filter(move |d| {
        remote
            .get(&d.uid)
            .is_some_and(|r| r.filename != d.filename)
    })
}
