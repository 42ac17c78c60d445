//! Configuration for clipshelf.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variable (CLIPSHELF_ROOT)
//! 2. Config file (.clipshelf/config.yaml)
//! 3. Defaults (./media, mp4 raw files, json sidecars)
//!
//! Config file discovery:
//! - Searches current directory and parents for .clipshelf/config.yaml
//! - Falls back to the user config directory (e.g. ~/.config/clipshelf/config.yaml)
//! - A relative library root is resolved against the project directory
//!   (the parent of .clipshelf/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::SafeCharset;
use crate::library::LibraryOptions;

/// Environment variable overriding the library root
pub const ROOT_ENV: &str = "CLIPSHELF_ROOT";

/// Library root used when nothing else is configured
pub const DEFAULT_ROOT: &str = "media";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub library: LibraryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryConfig {
    /// Media root (relative to the project directory)
    pub root: Option<String>,
    /// Extensions picked up as raw clips
    pub raw_extensions: Option<Vec<String>>,
    /// Sidecar extension
    pub metadata_extension: Option<String>,
    /// Whether `#` is allowed in clip strings
    pub allow_hash: Option<bool>,
    /// Censored titles must be longer than this
    pub min_censored_title_len: Option<usize>,
}

impl LibraryConfig {
    /// Overlay file settings on the defaults
    pub fn to_options(&self) -> LibraryOptions {
        let defaults = LibraryOptions::default();
        LibraryOptions {
            charset: SafeCharset {
                allow_hash: self.allow_hash.unwrap_or(defaults.charset.allow_hash),
            },
            metadata_extension: self
                .metadata_extension
                .clone()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or(defaults.metadata_extension),
            raw_extensions: self
                .raw_extensions
                .as_ref()
                .map(|exts| exts.iter().map(|e| e.trim_start_matches('.').to_string()).collect())
                .unwrap_or(defaults.raw_extensions),
            min_censored_title_len: self
                .min_censored_title_len
                .unwrap_or(defaults.min_censored_title_len),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Library root directory
    pub root: PathBuf,
    /// Discovery settings
    pub options: LibraryOptions,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".clipshelf").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let user_config = dirs::config_dir()?.join("clipshelf").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Build the resolved configuration from an optional config file
fn resolve(config_file: Option<PathBuf>, env_root: Option<String>) -> Result<ResolvedConfig> {
    let (file_root, options) = match config_file {
        Some(ref config_path) => {
            let config = load_config_file(config_path)?;

            // Base directory is the parent of .clipshelf/
            let base_dir = config_path
                .parent()
                .and_then(|p| p.parent())
                .unwrap_or(Path::new("."));

            let root = config
                .library
                .root
                .as_deref()
                .map(|root| resolve_path(base_dir, root));

            (root, config.library.to_options())
        }
        None => (None, LibraryOptions::default()),
    };

    let root = env_root
        .map(PathBuf::from)
        .or(file_root)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

    Ok(ResolvedConfig {
        root,
        options,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    resolve(find_config_file(), std::env::var(ROOT_ENV).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
