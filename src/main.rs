// Main entry point - Dependency injection and the sync loop
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::pull_service::PullService;
use crate::application::push_service::PushService;
use crate::application::scheduler::Scheduler;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::grafana_client::GrafanaClient;
use crate::infrastructure::local_store::LocalStore;
use crate::presentation::cli::Cli;
use crate::presentation::signals::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let cli = Cli::parse();
    let settings = load_settings(&cli.overrides())?;
    tracing::debug!("Loaded settings: {:?}", settings);

    // Create repository (infrastructure layer)
    let repository = Arc::new(
        GrafanaClient::new(settings.grafana_addr.clone(), settings.auth.clone())
            .context("error creating Grafana client")?,
    );
    let store = LocalStore::new(settings.dir.clone());

    // Create services (application layer)
    let push_service = PushService::new(repository.clone(), store.clone());
    let pull_service = PullService::new(repository, store);
    let scheduler = Scheduler::new(push_service, pull_service, settings.interval);

    // Listen for shutdown from the start so a signal during a cycle is not lost
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });

    tracing::info!(
        "Syncing {} with {} every {:?}",
        settings.dir.display(),
        settings.grafana_addr,
        settings.interval
    );
    scheduler
        .run(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    Ok(())
}
