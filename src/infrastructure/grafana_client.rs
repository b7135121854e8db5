// Grafana HTTP API implementation of the repository
use crate::application::grafana_repository::{
    CreateFolderError, DashboardSummary, Folder, GrafanaError, GrafanaRepository,
};
use crate::infrastructure::config::Auth;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Largest page the search API hands out
const SEARCH_PAGE_SIZE: usize = 5000;

#[derive(Debug, Clone)]
pub struct GrafanaClient {
    host: String,
    auth: Auth,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DashboardEnvelope<'a> {
    #[serde(borrow)]
    dashboard: &'a RawValue,
}

#[derive(Debug, Serialize)]
struct CreateFolderRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct SaveDashboardRequest<'a> {
    dashboard: &'a RawValue,
    #[serde(rename = "folderId")]
    folder_id: i64,
    overwrite: bool,
}

impl GrafanaClient {
    pub fn new(host: String, auth: Auth) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("grafana-local-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            auth,
            client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.host, path))
            .header("Accept", "application/json");

        match &self.auth {
            Auth::ApiKey(key) => builder.bearer_auth(key),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        }
    }

    /// Send a request and return the body of a successful response
    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<Bytes, GrafanaError> {
        let (status, body) = self.send(endpoint, request).await?;
        if !status.is_success() {
            return Err(status_error(endpoint, status, &body));
        }
        Ok(body)
    }

    async fn send(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<(StatusCode, Bytes), GrafanaError> {
        let request_error = |source| GrafanaError::Request {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(request_error)?;
        Ok((status, body))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GrafanaError> {
        let endpoint = endpoint_of(path);
        let body = self.execute(endpoint, self.request(Method::GET, path)).await?;
        decode(endpoint, &body)
    }
}

#[async_trait]
impl GrafanaRepository for GrafanaClient {
    async fn search_folders(&self, query: &str) -> Result<Vec<Folder>, GrafanaError> {
        let path = format!(
            "/api/search?type=dash-folder&query={}",
            urlencoding::encode(query)
        );
        self.fetch_json(&path).await
    }

    async fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, GrafanaError> {
        let mut dashboards = Vec::new();
        let mut page = 1;

        loop {
            let path = format!(
                "/api/search?type=dash-db&limit={}&page={}",
                SEARCH_PAGE_SIZE, page
            );
            let batch: Vec<DashboardSummary> = self.fetch_json(&path).await?;
            let done = batch.len() < SEARCH_PAGE_SIZE;
            dashboards.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        tracing::debug!("Grafana reported {} dashboards", dashboards.len());
        Ok(dashboards)
    }

    async fn create_folder(&self, title: &str) -> Result<Folder, CreateFolderError> {
        let endpoint = "/api/folders";
        let request = self
            .request(Method::POST, endpoint)
            .json(&CreateFolderRequest { title });

        let (status, body) = self.send(endpoint, request).await?;
        if status.is_success() {
            return Ok(decode(endpoint, &body)?);
        }
        Err(create_folder_failure(endpoint, status, &body))
    }

    async fn get_raw_dashboard(&self, uid: &str) -> Result<Bytes, GrafanaError> {
        let endpoint = "/api/dashboards/uid";
        let path = format!("{}/{}", endpoint, urlencoding::encode(uid));
        let body = self.execute(endpoint, self.request(Method::GET, &path)).await?;
        extract_dashboard(&body).map_err(|source| GrafanaError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn save_raw_dashboard(
        &self,
        dashboard: &[u8],
        folder_id: i64,
        overwrite: bool,
    ) -> Result<(), GrafanaError> {
        let endpoint = "/api/dashboards/db";
        let dashboard: &RawValue =
            serde_json::from_slice(dashboard).map_err(|source| GrafanaError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let request = self.request(Method::POST, endpoint).json(&SaveDashboardRequest {
            dashboard,
            folder_id,
            overwrite,
        });
        self.execute(endpoint, request).await?;
        Ok(())
    }
}

/// Path without its query string, used to label errors
fn endpoint_of(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T, GrafanaError> {
    serde_json::from_slice(body).map_err(|source| GrafanaError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn status_error(endpoint: &str, status: StatusCode, body: &[u8]) -> GrafanaError {
    GrafanaError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).trim().to_string(),
    }
}

/// The dashboard model from a `GET /api/dashboards/uid/:uid` response, byte for byte
fn extract_dashboard(body: &[u8]) -> Result<Bytes, serde_json::Error> {
    let envelope: DashboardEnvelope = serde_json::from_slice(body)?;
    Ok(Bytes::copy_from_slice(envelope.dashboard.get().as_bytes()))
}

/// Grafana answers 409 (or 412 on older versions) when a folder with the same
/// title exists. A failed response that still carries folder metadata with a
/// version is treated the same way.
fn create_folder_failure(endpoint: &str, status: StatusCode, body: &[u8]) -> CreateFolderError {
    let existing = serde_json::from_slice::<Folder>(body).ok();

    match status {
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            CreateFolderError::AlreadyExists { existing }
        }
        _ => match existing {
            Some(folder) if folder.version >= 1 => CreateFolderError::AlreadyExists {
                existing: Some(folder),
            },
            _ => status_error(endpoint, status, body).into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client =
            GrafanaClient::new("http://grafana:3000/".to_string(), Auth::ApiKey("k".into())).unwrap();
        assert_eq!(client.host, "http://grafana:3000");
    }

    #[test]
    fn test_request_urls_and_auth() {
        let client =
            GrafanaClient::new("http://grafana:3000".to_string(), Auth::ApiKey("k".into())).unwrap();
        let request = client
            .request(Method::GET, "/api/search?type=dash-folder&query=team%201")
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://grafana:3000/api/search?type=dash-folder&query=team%201"
        );
        assert_eq!(request.headers()["authorization"], "Bearer k");

        let basic = GrafanaClient::new(
            "http://grafana:3000".to_string(),
            Auth::Basic {
                username: "admin".into(),
                password: "admin".into(),
            },
        )
        .unwrap();
        let request = basic.request(Method::GET, "/api/folders").build().unwrap();
        assert_eq!(request.headers()["authorization"], "Basic YWRtaW46YWRtaW4=");
    }

    #[test]
    fn test_endpoint_of_drops_query() {
        assert_eq!(endpoint_of("/api/search?type=dash-db&page=2"), "/api/search");
        assert_eq!(endpoint_of("/api/folders"), "/api/folders");
    }

    #[test]
    fn test_extract_dashboard_keeps_raw_bytes() {
        let body = br#"{"meta":{"slug":"latency","folderId":7},"dashboard":{"id":12,"uid":"lat","title":"Latency"}}"#;
        let raw = extract_dashboard(body).unwrap();
        assert_eq!(&raw[..], br#"{"id":12,"uid":"lat","title":"Latency"}"#);

        assert!(extract_dashboard(br#"{"meta":{}}"#).is_err());
    }

    #[test]
    fn test_conflict_status_means_existing_folder() {
        let body = br#"{"message":"a folder or dashboard in the general folder with the same name already exists"}"#;
        let err = create_folder_failure("/api/folders", StatusCode::CONFLICT, body);
        assert!(matches!(err, CreateFolderError::AlreadyExists { existing: None }));
    }

    #[test]
    fn test_failure_with_versioned_folder_means_existing_folder() {
        let body = br#"{"id":9,"uid":"f9","title":"team1","version":2}"#;
        let err = create_folder_failure("/api/folders", StatusCode::BAD_REQUEST, body);
        match err {
            CreateFolderError::AlreadyExists { existing: Some(folder) } => assert_eq!(folder.id, 9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_other_failures_are_transport_errors() {
        let err = create_folder_failure(
            "/api/folders",
            StatusCode::FORBIDDEN,
            br#"{"message":"Access denied"}"#,
        );
        match err {
            CreateFolderError::Transport(GrafanaError::Status { status, body, .. }) => {
                assert_eq!(status, 403);
                assert!(body.contains("Access denied"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let unversioned = br#"{"id":9,"uid":"f9","title":"team1","version":0}"#;
        let err = create_folder_failure("/api/folders", StatusCode::INTERNAL_SERVER_ERROR, unversioned);
        assert!(matches!(err, CreateFolderError::Transport(_)));
    }

    #[test]
    fn test_save_request_embeds_raw_dashboard() {
        let raw: &RawValue = serde_json::from_str(r#"{"uid":"u1",  "title":"A"}"#).unwrap();
        let body = serde_json::to_string(&SaveDashboardRequest {
            dashboard: raw,
            folder_id: 7,
            overwrite: true,
        })
        .unwrap();
        assert_eq!(
            body,
            r#"{"dashboard":{"uid":"u1",  "title":"A"},"folderId":7,"overwrite":true}"#
        );
    }
}
