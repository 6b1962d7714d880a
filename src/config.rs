use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    pub backend: BackendConfig,
    #[serde(default)]
    pub tokens: TokenConfig,
    #[serde(default)]
    pub gauges: GaugeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Full URL of the JSON-RPC endpoint, e.g. `http://10.0.0.5:8080/tarantool`.
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Status literals the backend reports. These are wire contracts with the
/// store, not display strings.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_alive")]
    pub alive: i64,
    #[serde(default = "default_replication_ok")]
    pub replication_ok: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GaugeConfig {
    #[serde(default = "default_rps_max")]
    pub rps_max: u32,
}

fn default_cluster_name() -> String {
    "tnt".to_string()
}

fn default_listen_port() -> u16 {
    9090
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_alive() -> i64 {
    1
}

fn default_replication_ok() -> String {
    "follow".to_string()
}

fn default_rps_max() -> u32 {
    2000
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            alive: default_alive(),
            replication_ok: default_replication_ok(),
        }
    }
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            rps_max: default_rps_max(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("reading config {}: {}", path.display(), e))?;
        let cfg: Config =
            serde_yaml::from_str(&data).map_err(|e| format!("parsing config: {}", e))?;

        if cfg.backend.url.is_empty() {
            return Err("backend.url must be configured".into());
        }

        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }
}
