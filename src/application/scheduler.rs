// Sync loop - one push at startup, then a pull every interval until shutdown
use crate::application::pull_service::PullService;
use crate::application::push_service::PushService;
use crate::application::sync_error::SyncError;
use std::future::Future;
use std::time::Duration;

pub struct Scheduler {
    push: PushService,
    pull: PullService,
    interval: Duration,
}

impl Scheduler {
    pub fn new(push: PushService, pull: PullService, interval: Duration) -> Self {
        Self {
            push,
            pull,
            interval,
        }
    }

    /// Run until `shutdown` resolves or a cycle fails.
    ///
    /// Shutdown is only observed between cycles: a pull that has started
    /// always runs to completion or failure.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), SyncError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Syncing local dashboards to Grafana...");
        let pushed = self.push.sync_local_to_remote().await?;
        tracing::info!("Uploaded {} dashboards", pushed.uploaded);

        tokio::pin!(shutdown);
        let mut wait = Duration::ZERO;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutting down");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {}
            }

            tracing::info!("Syncing Grafana dashboards to local directory...");
            let pulled = self.pull.sync_remote_to_local().await?;
            tracing::info!(
                "done. written={} unchanged={} deleted={}",
                pulled.written,
                pulled.unchanged,
                pulled.deleted
            );
            wait = self.interval;
        }
    }
}
