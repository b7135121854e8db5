// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod dashboard_json;
pub mod grafana_client;
pub mod local_store;
