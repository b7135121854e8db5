// Repository trait for the remote Grafana instance
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

/// Folder id Grafana uses for dashboards outside any folder
pub const GENERAL_FOLDER_ID: i64 = 0;

/// A dashboard as reported by the search API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardSummary {
    pub uid: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Absent for dashboards in the General folder
    #[serde(default, rename = "folderTitle")]
    pub folder_title: String,
}

/// A folder as reported by the search or folder APIs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Error)]
pub enum GrafanaError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum CreateFolderError {
    /// Grafana refused to create the folder because one with the same title exists.
    /// `existing` carries the folder when the response included it.
    #[error("folder already exists")]
    AlreadyExists { existing: Option<Folder> },

    #[error(transparent)]
    Transport(#[from] GrafanaError),
}

#[async_trait]
pub trait GrafanaRepository: Send + Sync {
    /// Folders whose title contains `query` (Grafana matches loosely, not exactly)
    async fn search_folders(&self, query: &str) -> Result<Vec<Folder>, GrafanaError>;

    /// Every dashboard on the instance
    async fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, GrafanaError>;

    async fn create_folder(&self, title: &str) -> Result<Folder, CreateFolderError>;

    /// The raw dashboard model (the `dashboard` object, without `meta`)
    async fn get_raw_dashboard(&self, uid: &str) -> Result<Bytes, GrafanaError>;

    /// Create or replace a dashboard from its raw model
    async fn save_raw_dashboard(
        &self,
        dashboard: &[u8],
        folder_id: i64,
        overwrite: bool,
    ) -> Result<(), GrafanaError>;
}
