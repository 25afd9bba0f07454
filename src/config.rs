use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::{Result, TaskError};
use crate::task::TaskStatus;

pub const CONFIG_FILE: &str = "taskdesk.json";
pub const BASE_URL_ENV: &str = "TASKDESK_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root; `/api/tasks` is appended.
    pub base_url: String,
    pub log_level: String,
    /// Where the terminal UI writes its logs.
    pub log_file: PathBuf,
    /// Filter applied to the first load.
    pub default_status: Option<TaskStatus>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            log_level: "info".to_string(),
            log_file: PathBuf::from("taskdesk.log"),
            default_status: None,
        }
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise starts from defaults. The
    /// `TASKDESK_BASE_URL` variable wins over the file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let data = fs::read_to_string(path)?;
            serde_json::from_str(&data).map_err(|err| {
                TaskError::Config(format!("{}: {}", path.display(), err))
            })?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        Ok(config)
    }

    /// Writes a default config into `dir`. Returns false when one is
    /// already there.
    pub fn init(dir: &Path) -> Result<bool> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Ok(false);
        }
        fs::create_dir_all(dir)?;
        fs::write(&config_path, serde_json::to_string_pretty(&Config::default())?)?;
        Ok(true)
    }
}
