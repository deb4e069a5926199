use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration. Defaults are overridden by `DEVICES_*` environment
/// variables, e.g. `DEVICES_DATABASE_URL` or `DEVICES_STORAGE_TIMEOUT_MS`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    /// Upper bound for any single storage call.
    pub storage_timeout_ms: u64,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Request body cap; applies to CSV uploads as well as JSON bodies.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:devices.db".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            storage_timeout_ms: 5_000,
            default_page_size: 10,
            max_page_size: 100,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub const ENV_PREFIX: &'static str = "DEVICES_";

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(Self::ENV_PREFIX))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms.max(1))
    }
}
