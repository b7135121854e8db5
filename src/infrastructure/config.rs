use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GRAFANA_ADDR: &str = "http://localhost:3000";
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
const ENV_PREFIX: &str = "GRAFANA_SYNC";

#[derive(Debug, Deserialize, Clone)]
pub struct SyncerConfig {
    pub grafana: GrafanaSettings,
    pub sync: SyncSettings,
}

#[derive(Deserialize, Clone)]
pub struct GrafanaSettings {
    pub addr: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncSettings {
    pub dir: PathBuf,
    pub interval_secs: u64,
}

/// Values given on the command line; they win over every other source
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub addr: Option<String>,
    pub dir: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub interval_secs: Option<u64>,
}

#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    ApiKey(String),
    Basic { username: String, password: String },
}

/// Resolved, immutable settings for the whole process
#[derive(Debug, Clone)]
pub struct Settings {
    pub grafana_addr: String,
    pub auth: Auth,
    pub dir: PathBuf,
    pub interval: Duration,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::ApiKey(_) => f.write_str("ApiKey(***)"),
            Auth::Basic { username, .. } => write!(f, "Basic({}:***)", username),
        }
    }
}

impl fmt::Debug for GrafanaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrafanaSettings")
            .field("addr", &self.addr)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Build settings from defaults, an optional config file, `GRAFANA_SYNC_*`
/// environment variables and command line overrides, in that order.
pub fn load_settings(overrides: &ConfigOverrides) -> anyhow::Result<Settings> {
    let mut builder = config::Config::builder()
        .set_default("grafana.addr", DEFAULT_GRAFANA_ADDR)?
        .set_default("sync.dir", ".")?
        .set_default("sync.interval_secs", DEFAULT_INTERVAL_SECS)?;

    if let Some(path) = &overrides.config_file {
        builder = builder.add_source(config::File::from(path.as_path()));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("grafana.addr", overrides.addr.clone())?
        .set_override_option("grafana.api_key", overrides.api_key.clone())?
        .set_override_option("grafana.username", overrides.username.clone())?
        .set_override_option("grafana.password", overrides.password.clone())?
        .set_override_option("sync.dir", overrides.dir.clone())?
        .set_override_option("sync.interval_secs", overrides.interval_secs)?
        .build()?;

    let config: SyncerConfig = settings.try_deserialize()?;
    config.into_settings()
}

impl SyncerConfig {
    pub fn into_settings(self) -> anyhow::Result<Settings> {
        let auth = resolve_auth(&self.grafana)?;
        if self.sync.interval_secs == 0 {
            anyhow::bail!("sync interval must be at least one second");
        }

        Ok(Settings {
            grafana_addr: self.grafana.addr.trim_end_matches('/').to_string(),
            auth,
            dir: self.sync.dir,
            interval: Duration::from_secs(self.sync.interval_secs),
        })
    }
}

/// An API key wins over a username/password pair
fn resolve_auth(grafana: &GrafanaSettings) -> anyhow::Result<Auth> {
    let present = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    if let Some(key) = present(&grafana.api_key) {
        return Ok(Auth::ApiKey(key));
    }
    match (present(&grafana.username), present(&grafana.password)) {
        (Some(username), Some(password)) => Ok(Auth::Basic { username, password }),
        _ => anyhow::bail!("either --user/--pass, or --key, must be passed"),
    }
}
