// Application layer - Sync use cases and the remote service boundary
pub mod folder_resolver;
pub mod grafana_repository;
pub mod pull_service;
pub mod push_service;
pub mod scheduler;
pub mod sync_error;

#[cfg(test)]
pub mod fake_grafana;
