use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::animation::SequenceVariant;
use crate::utils::error::ResultExt;

/// Default port for the submission endpoint
pub const DEFAULT_PORT: u16 = 3000;

/// Default client-side timeout for the submission request
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub client: ClientSettings,

    #[serde(default)]
    pub animation: AnimationSettings,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Jsonl,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    /// Directory holding one `<collection>.jsonl` file per collection
    pub data_dir: String,
    pub storage: StorageBackend,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: format!("{}/data", Config::get_config_dir()),
            storage: StorageBackend::Jsonl,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the server, without the `/api/submit-email` path
    pub api_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: format!("http://localhost:{}", DEFAULT_PORT),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationSettings {
    pub variant: SequenceVariant,
    /// Fixed seed for the idle micro-animation; random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_seed: Option<u64>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).with_file_context(&display)?;
        let config: Config = serde_yaml::from_str(&content).with_config_context(&display)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get_config_dir() -> String {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/.dogmail", home)
    }

    pub fn get_config_path() -> String {
        format!("{}/config.yaml", Self::get_config_dir())
    }

    /// Loads `~/.dogmail/config.yaml` when present, then applies environment overrides.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::get_config_path();
        let config_file = Path::new(&config_path);

        let mut config = if config_file.exists() {
            match Self::load_from_file(config_file) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring unreadable config at {config_path}: {e}");
                    Self::default()
                }
            }
        } else {
            info!("No config at {config_path}, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_file(Self::get_config_path())
    }

    /// Applies `DOGMAIL_PORT`, `DOGMAIL_API_URL` and `DOGMAIL_DATA_DIR`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("DOGMAIL_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!("Invalid DOGMAIL_PORT value {port:?}: {e}"),
            }
        }

        if let Ok(api_url) = std::env::var("DOGMAIL_API_URL") {
            self.client.api_url = api_url;
        }

        if let Ok(data_dir) = std::env::var("DOGMAIL_DATA_DIR") {
            self.server.data_dir = data_dir;
        }
    }
}
