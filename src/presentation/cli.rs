// Command line flags
use crate::infrastructure::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "grafana-local-sync",
    version,
    about = "Keep a directory of Grafana dashboards in sync with a Grafana instance",
    long_about = None,
)]
pub struct Cli {
    /// The address Grafana is listening on [default: http://localhost:3000]
    #[arg(long)]
    pub addr: Option<String>,

    /// The directory of Grafana dashboards to be synced [default: .]
    #[arg(long)]
    pub dir: Option<String>,

    /// Grafana username, used together with --pass
    #[arg(long)]
    pub user: Option<String>,

    /// Grafana password, used together with --user
    #[arg(long)]
    pub pass: Option<String>,

    /// Grafana API key or service account token
    #[arg(long)]
    pub key: Option<String>,

    /// Seconds between pulls from Grafana [default: 30]
    #[arg(long)]
    pub interval: Option<u64>,

    /// Optional config file (TOML, YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            addr: self.addr.clone(),
            dir: self.dir.clone(),
            username: self.user.clone(),
            password: self.pass.clone(),
            api_key: self.key.clone(),
            interval_secs: self.interval,
        }
    }
}
