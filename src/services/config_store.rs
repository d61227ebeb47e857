// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::services::oracle::{DEFAULT_MAX_TOKENS, DEFAULT_ORACLE_URL, DEFAULT_TIMEOUT_SECS};

/// Characters analyzed per request; longer input is truncated.
pub const DEFAULT_MAX_CHARS: usize = 6000;
/// Setting this points the oracle at a scoring service.
pub const ORACLE_URL_ENV: &str = "AUTHORSHIP_LENS_ORACLE_URL";
const BACKUPS_KEPT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OracleBackend {
    Http,
    #[default]
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleConfig {
    #[serde(default)]
    pub backend: OracleBackend,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            backend: OracleBackend::Heuristic,
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

fn default_base_url() -> String { DEFAULT_ORACLE_URL.to_string() }
fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_max_tokens() -> usize { DEFAULT_MAX_TOKENS }
fn default_max_chars() -> usize { DEFAULT_MAX_CHARS }

impl AppConfig {
    /// Apply environment overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ORACLE_URL_ENV) {
            if !url.trim().is_empty() {
                self.oracle.base_url = url.trim().to_string();
                self.oracle.backend = OracleBackend::Http;
            }
        }
        self
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("authorship-lens"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Write `config`, first copying any existing file into `backups/`.
    ///
    /// Returns the backup path when one was made.
    pub fn save(&self, config: &AppConfig) -> Result<Option<PathBuf>, String> {
        self.ensure_dir()?;

        let backup = if self.config_file.exists() {
            Some(self.backup_current()?)
        } else {
            None
        };

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))?;

        let backup_label = backup
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string());
        info!(
            path = %self.config_file.display(),
            backend = ?config.oracle.backend,
            backup = %backup_label,
            "config.saved"
        );
        Ok(backup)
    }

    fn backup_current(&self) -> Result<PathBuf, String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", stamp));
        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        prune_backups(&backup_dir, BACKUPS_KEPT);
        Ok(backup_file)
    }
}

/// Delete all but the `keep` newest backups. Failures are ignored.
fn prune_backups(backup_dir: &Path, keep: usize) {
    let Ok(read) = fs::read_dir(backup_dir) else {
        return;
    };
    // Timestamped names sort oldest first.
    let mut names: Vec<PathBuf> = read
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    names.sort();
    let excess = names.len().saturating_sub(keep);
    for path in names.into_iter().take(excess) {
        let _ = fs::remove_file(path);
    }
}
