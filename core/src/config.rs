//! Client configuration.
//!
//! Sources, from lowest to highest priority:
//! 1. built-in defaults (`api.base_url = "/api"`)
//! 2. an optional `blog-client.toml` (or an explicit file)
//! 3. environment variables with prefix `BLOG` and separator `__`,
//!    e.g. `BLOG_API__BASE_URL=http://localhost:3000/api`

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::storage::StoreError;

pub const DEFAULT_BASE_URL: &str = "/api";

const CONFIG_FILE_NAME: &str = "blog-client";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Prefix joined with every request path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Where the token and preferences persist. `None` keeps them in memory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(None)
}

pub fn load_config_from_path(config_path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let mut builder = Config::builder().set_default("api.base_url", DEFAULT_BASE_URL)?;

    builder = match config_path {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name(CONFIG_FILE_NAME).required(false)),
    };

    builder = builder.add_source(
        Environment::with_prefix("BLOG")
            .prefix_separator("_")
            .separator("__"),
    );

    let config: ClientConfig = builder.build()?.try_deserialize()?;
    validate_config(&config)?;
    tracing::debug!(base_url = %config.api.base_url, storage = ?config.storage.path, "loaded client configuration");
    Ok(config)
}

fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api.base_url cannot be empty".to_string(),
        ));
    }
    if config
        .storage
        .path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        return Err(ConfigError::Validation(
            "storage.path cannot be empty when set".to_string(),
        ));
    }
    Ok(())
}
