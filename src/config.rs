use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_ENV: &str = "SUPPORT_DESK_CONFIG_DIR";
const API_URL_ENV: &str = "SUPPORT_API_URL";
const TIMEOUT_ENV: &str = "SUPPORT_API_TIMEOUT_SECS";

/// Effective settings after merging defaults, the stored file and the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
}

/// Values persisted by `config init`. Kept as text so the wizard can show
/// and edit them verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_debounce_ms: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(&stored, |key| env::var(key).ok())
    }

    /// Environment wins over the stored file, which wins over defaults.
    pub fn resolve(
        stored: &StoredConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let api_base_url = pick(lookup(API_URL_ENV), stored.api_base_url.as_deref())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base_url = validate_base_url(&api_base_url)?;

        let timeout_secs = pick(lookup(TIMEOUT_ENV), stored.request_timeout_secs.as_deref());
        let request_timeout = match timeout_secs {
            Some(raw) => Duration::from_secs(parse_positive(&raw, "request timeout")?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let search_debounce = match pick(None, stored.search_debounce_ms.as_deref()) {
            Some(raw) => Duration::from_millis(raw.parse().map_err(|_| {
                AppError::Configuration(format!(
                    "search debounce must be a number of milliseconds, got '{raw}'"
                ))
            })?),
            None => Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            search_debounce,
        })
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", "support-desk")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            AppError::Configuration("unable to determine a configuration directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

fn pick(env_value: Option<String>, stored: Option<&str>) -> Option<String> {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| stored.filter(|v| !v.trim().is_empty()).map(str::to_string))
        .map(|v| v.trim().to_string())
}

fn validate_base_url(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(AppError::Configuration(format!(
            "API base URL must start with http:// or https://, got '{raw}'"
        )));
    }
    Ok(trimmed.to_string())
}

fn parse_positive(raw: &str, what: &str) -> AppResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::Configuration(format!(
            "{what} must be a positive whole number, got '{raw}'"
        ))),
    }
}
