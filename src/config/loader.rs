//! Configuration Loader
//!
//! Environment-aware settings loading. A YAML file provides the base layer and
//! `SHOTLINE__SECTION__KEY` environment variables override individual values.

use super::error::{ConfigResult, ConfigurationError};
use super::EngineConfig;
use crate::constants::env as env_names;
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loaded engine settings together with where they came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: EngineConfig,
    environment: String,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load settings from environment overrides only
    pub fn load() -> ConfigResult<ConfigManager> {
        Self::build(None)
    }

    /// Load settings from a YAML file layered with environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<ConfigManager> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigurationError::file_read_error(
                path.display().to_string(),
                "not a regular file",
            ));
        }
        Self::build(Some(path))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: EngineConfig) -> ConfigResult<ConfigManager> {
        config.validate()?;
        Ok(ConfigManager {
            config,
            environment: Self::detect_environment(),
            source: None,
        })
    }

    fn build(path: Option<&Path>) -> ConfigResult<ConfigManager> {
        let environment = Self::detect_environment();

        debug!(
            environment = %environment,
            source = ?path.map(|p| p.display().to_string()),
            "Loading engine settings"
        );

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(env_names::SETTINGS_PREFIX)
                .separator(env_names::SETTINGS_SEPARATOR)
                .try_parsing(true),
        );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            environment = %environment,
            checkpoint_directory = %config.checkpoint.directory.display(),
            checkpoint_interval = config.checkpoint.interval,
            max_workers = config.parallel.max_workers,
            backend = ?config.parallel.backend,
            "Engine settings loaded"
        );

        Ok(ConfigManager {
            config,
            environment,
            source: path.map(Path::to_path_buf),
        })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Detect the deployment environment from environment variables
    pub fn detect_environment() -> String {
        env::var(env_names::ENVIRONMENT)
            .or_else(|_| env::var(env_names::ENVIRONMENT_FALLBACK))
            .unwrap_or_else(|_| "development".to_string())
    }
}
