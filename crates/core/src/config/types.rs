use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub vault_root: String,
    /// Folders to exclude from indexing (relative to vault_root).
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Search and block-recognition settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum fuzzy distance (0.0 = exact, 1.0 = anything) for a term to match.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Info string of fenced code blocks treated as query blocks.
    #[serde(default = "default_block_language")]
    pub block_language: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { threshold: default_threshold(), block_language: default_block_language() }
    }
}

fn default_threshold() -> f64 {
    0.4
}

fn default_block_language() -> String {
    "oql".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub vault_root: PathBuf,
    /// Folders to exclude from indexing (resolved to absolute paths).
    pub excluded_folders: Vec<PathBuf>,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
}
