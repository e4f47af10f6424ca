//! Locates and loads the configuration for the `ferry` binary.
//!
//! Resolution order: the file named by `FERRY_CONFIG`, then
//! `~/.config/ferry/config.toml` if it exists, then built-in defaults.
//! `FERRY_BASE_URL` and `FERRY_DOWNLOAD_DIR` override the loaded values.

use std::path::PathBuf;

use anyhow::Context;
use ferry_core::Config;

pub const CONFIG_ENV: &str = "FERRY_CONFIG";
pub const BASE_URL_ENV: &str = "FERRY_BASE_URL";
pub const DOWNLOAD_DIR_ENV: &str = "FERRY_DOWNLOAD_DIR";

/// Loads configuration from the process environment.
pub fn load() -> anyhow::Result<Config> {
    resolve(|key| std::env::var(key).ok())
}

/// Loads configuration using `env` to look up variables.
pub fn resolve(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
    let path = env(CONFIG_ENV).map(PathBuf::from).or_else(|| {
        let default = PathBuf::from(env("HOME")?)
            .join(".config")
            .join("ferry")
            .join("config.toml");
        default.exists().then_some(default)
    });

    let mut config = match &path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(path) = &path {
        tracing::info!(path = %path.display(), "loaded config");
    }

    if let Some(url) = env(BASE_URL_ENV) {
        config = config.with_base_url(url);
    }
    if let Some(dir) = env(DOWNLOAD_DIR_ENV) {
        config = config.with_download_dir(dir);
    }
    Ok(config)
}
