// In-memory Grafana used by the service tests
use crate::application::grafana_repository::{
    CreateFolderError, DashboardSummary, Folder, GrafanaError, GrafanaRepository,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Every call made against the fake, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SearchFolders(String),
    ListDashboards,
    CreateFolder(String),
    GetDashboard(String),
    SaveDashboard { uid: String, folder_id: i64, overwrite: bool },
}

#[derive(Debug, Clone)]
pub struct StoredDashboard {
    pub folder_id: i64,
    pub raw: Vec<u8>,
}

/// How `create_folder` should behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    Create,
    /// Report a conflict and include the existing folder in the response
    ConflictWithFolder,
    /// Report a conflict with an empty body, the folder becomes searchable
    ConflictWithoutBody,
    /// Report a conflict but never expose the folder
    ConflictVanished,
    Fail,
}

/// Runs after a call is recorded, outside the state lock
type CallHook = Arc<dyn Fn(&Call) + Send + Sync>;

struct State {
    folders: Vec<Folder>,
    dashboards: BTreeMap<String, StoredDashboard>,
    calls: Vec<Call>,
    next_folder_id: i64,
    create_mode: CreateMode,
    fail_get: Option<String>,
    fail_save: Option<String>,
    hook: Option<CallHook>,
}

pub struct FakeGrafana {
    state: Mutex<State>,
}

impl Default for FakeGrafana {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGrafana {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                folders: Vec::new(),
                dashboards: BTreeMap::new(),
                calls: Vec::new(),
                next_folder_id: 100,
                create_mode: CreateMode::Create,
                fail_get: None,
                fail_save: None,
                hook: None,
            }),
        }
    }

    pub fn with_folder(self, id: i64, title: &str) -> Self {
        self.state.lock().unwrap().folders.push(Folder {
            id,
            title: title.to_string(),
            version: 1,
        });
        self
    }

    /// Store a dashboard; `raw` must carry the `uid` and `title` fields
    pub fn with_dashboard(self, folder_id: i64, raw: &str) -> Self {
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        let uid = value["uid"].as_str().unwrap().to_string();
        self.state.lock().unwrap().dashboards.insert(
            uid,
            StoredDashboard {
                folder_id,
                raw: raw.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn with_create_mode(self, mode: CreateMode) -> Self {
        self.state.lock().unwrap().create_mode = mode;
        self
    }

    pub fn failing_get(self, uid: &str) -> Self {
        self.state.lock().unwrap().fail_get = Some(uid.to_string());
        self
    }

    pub fn failing_save(self, uid: &str) -> Self {
        self.state.lock().unwrap().fail_save = Some(uid.to_string());
        self
    }

    /// Run `hook` after every call, e.g. to change the local tree mid-cycle
    pub fn on_call(self, hook: impl Fn(&Call) + Send + Sync + 'static) -> Self {
        self.state.lock().unwrap().hook = Some(Arc::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn folders(&self) -> Vec<Folder> {
        self.state.lock().unwrap().folders.clone()
    }

    pub fn dashboard(&self, uid: &str) -> Option<StoredDashboard> {
        self.state.lock().unwrap().dashboards.get(uid).cloned()
    }

    fn record(&self, call: Call) {
        let hook = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call.clone());
            state.hook.clone()
        };
        if let Some(hook) = hook {
            hook(&call);
        }
    }

    fn status_error(endpoint: &str, status: u16) -> GrafanaError {
        GrafanaError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: String::new(),
        }
    }
}

fn dashboard_fields(raw: &[u8]) -> (String, String) {
    let value: serde_json::Value = serde_json::from_slice(raw).unwrap_or_default();
    let field = |name: &str| value[name].as_str().unwrap_or_default().to_string();
    (field("uid"), field("title"))
}

#[async_trait]
impl GrafanaRepository for FakeGrafana {
    async fn search_folders(&self, query: &str) -> Result<Vec<Folder>, GrafanaError> {
        self.record(Call::SearchFolders(query.to_string()));
        let state = self.state.lock().unwrap();
        let needle = query.to_lowercase();
        Ok(state
            .folders
            .iter()
            .filter(|f| f.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, GrafanaError> {
        self.record(Call::ListDashboards);
        let state = self.state.lock().unwrap();

        let summaries = state
            .dashboards
            .values()
            .map(|stored| {
                let (uid, title) = dashboard_fields(&stored.raw);
                let folder_title = state
                    .folders
                    .iter()
                    .find(|f| f.id == stored.folder_id)
                    .map(|f| f.title.clone())
                    .unwrap_or_default();
                let slug = crate::domain::dashboard::slugify(&title);
                DashboardSummary {
                    url: format!("/d/{}/{}", uid, slug),
                    uid,
                    title,
                    folder_title,
                }
            })
            .collect();
        Ok(summaries)
    }

    async fn create_folder(&self, title: &str) -> Result<Folder, CreateFolderError> {
        self.record(Call::CreateFolder(title.to_string()));
        let mut state = self.state.lock().unwrap();

        let id = state.next_folder_id;
        let folder = Folder {
            id,
            title: title.to_string(),
            version: 1,
        };

        let mode = state.create_mode;
        match mode {
            CreateMode::Create => {
                state.next_folder_id += 1;
                state.folders.push(folder.clone());
                Ok(folder)
            }
            CreateMode::ConflictWithFolder => {
                state.next_folder_id += 1;
                Err(CreateFolderError::AlreadyExists {
                    existing: Some(folder),
                })
            }
            CreateMode::ConflictWithoutBody => {
                state.next_folder_id += 1;
                state.folders.push(folder);
                Err(CreateFolderError::AlreadyExists { existing: None })
            }
            CreateMode::ConflictVanished => {
                Err(CreateFolderError::AlreadyExists { existing: None })
            }
            CreateMode::Fail => Err(Self::status_error("/api/folders", 500).into()),
        }
    }

    async fn get_raw_dashboard(&self, uid: &str) -> Result<Bytes, GrafanaError> {
        self.record(Call::GetDashboard(uid.to_string()));
        let state = self.state.lock().unwrap();

        if state.fail_get.as_deref() == Some(uid) {
            return Err(Self::status_error("/api/dashboards/uid", 500));
        }
        state
            .dashboards
            .get(uid)
            .map(|stored| Bytes::from(stored.raw.clone()))
            .ok_or_else(|| Self::status_error("/api/dashboards/uid", 404))
    }

    async fn save_raw_dashboard(
        &self,
        dashboard: &[u8],
        folder_id: i64,
        overwrite: bool,
    ) -> Result<(), GrafanaError> {
        let (uid, _) = dashboard_fields(dashboard);
        self.record(Call::SaveDashboard {
            uid: uid.clone(),
            folder_id,
            overwrite,
        });

        let mut state = self.state.lock().unwrap();
        if state.fail_save.as_deref() == Some(uid.as_str()) {
            return Err(Self::status_error("/api/dashboards/db", 500));
        }
        if !overwrite && state.dashboards.contains_key(&uid) {
            return Err(Self::status_error("/api/dashboards/db", 412));
        }
        state.dashboards.insert(
            uid,
            StoredDashboard {
                folder_id,
                raw: dashboard.to_vec(),
            },
        );
        Ok(())
    }
}
