use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cli::Cli;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";
pub const DEFAULT_MAX_FILES: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub raw_base_url: String,
    pub api_version: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub max_files: usize,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            user_agent: concat!("api-scout/", env!("CARGO_PKG_VERSION")).to_string(),
            max_files: DEFAULT_MAX_FILES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// On-disk shape of `config.json`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_base_url: Option<String>,
    raw_base_url: Option<String>,
    api_version: Option<String>,
    token: Option<String>,
    user_agent: Option<String>,
    max_files: Option<usize>,
    timeout_secs: Option<u64>,
}

impl Settings {
    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.raw_base_url {
            self.raw_base_url = v;
        }
        if let Some(v) = file.api_version {
            self.api_version = v;
        }
        if file.token.is_some() {
            self.token = file.token;
        }
        if let Some(v) = file.user_agent {
            self.user_agent = v;
        }
        if let Some(v) = file.max_files {
            self.max_files = v;
        }
        if let Some(v) = file.timeout_secs {
            self.timeout_secs = v;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GITHUB_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.token = Some(v);
        }
        if let Some(v) = lookup("API_SCOUT_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("API_SCOUT_RAW_URL") {
            self.raw_base_url = v;
        }
        if let Some(v) = lookup("API_SCOUT_API_VERSION") {
            self.api_version = v;
        }
        if let Some(v) = lookup("API_SCOUT_MAX_FILES") {
            match v.parse() {
                Ok(n) => self.max_files = n,
                Err(_) => warn!(
                    value = %v,
                    default = self.max_files,
                    "invalid API_SCOUT_MAX_FILES, keeping current value"
                ),
            }
        }
        if let Some(v) = lookup("API_SCOUT_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.timeout_secs = n,
                Err(_) => warn!(
                    value = %v,
                    default = self.timeout_secs,
                    "invalid API_SCOUT_TIMEOUT_SECS, keeping current value"
                ),
            }
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = cli.api_url.clone() {
            self.api_base_url = v;
        }
        if let Some(v) = cli.raw_url.clone() {
            self.raw_base_url = v;
        }
        if let Some(v) = cli.api_version.clone() {
            self.api_version = v;
        }
        if let Some(v) = cli.token.clone() {
            self.token = Some(v);
        }
    }
}

/// Defaults, then the config file, then the environment, then flags.
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::default();
    if let Some(path) = resolve_config_path(cli) {
        settings.apply_file(load_config_file(&path)?);
    }
    settings.apply_env(|key| env::var(key).ok());
    settings.apply_cli(cli);
    Ok(settings)
}

fn resolve_config_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(p) = cli.config.clone() {
        return Some(p);
    }

    if let Ok(p) = env::var("API_SCOUT_CONFIG") {
        return Some(PathBuf::from(p));
    }

    let default_path = api_scout_home()?.join("config.json");
    default_path.exists().then_some(default_path)
}

fn load_config_file(path: &Path) -> Result<FileSettings> {
    debug!(path = %path.display(), "loading config file");
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn api_scout_home() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("api-scout"))
}
