//! Configuration Loader
//!
//! Layers configuration sources with the `config` crate, lowest precedence first:
//!
//! 1. Built-in defaults ([`PipelineConfig::default`])
//! 2. A TOML file (explicit path, or `config/preprocessor.toml` when present)
//! 3. Environment variables, e.g. `PREPROCESSOR__COLLABORATORS__TIMEOUT_MS=250`

use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::{ConfigResult, ConfigurationError};
use super::PipelineConfig;

pub const DEFAULT_CONFIG_FILE: &str = "config/preprocessor";
pub const DEFAULT_ENV_PREFIX: &str = "PREPROCESSOR";

/// Current environment from environment variables
pub fn detect_environment() -> String {
    std::env::var("PREPROCESSOR_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Use `path` instead of the default file; an explicit file must exist
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> ConfigResult<PipelineConfig> {
        let (file_source, origin) = match &self.file {
            Some(path) => (
                File::from(path.as_path()).required(true),
                path.display().to_string(),
            ),
            None => (
                File::with_name(DEFAULT_CONFIG_FILE).required(false),
                DEFAULT_CONFIG_FILE.to_string(),
            ),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::Load {
                origin: origin.clone(),
                reason: e.to_string(),
            })?;

        let config: PipelineConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigurationError::Deserialize {
                    reason: e.to_string(),
                })?;

        config.validate()?;

        debug!(
            origin = %origin,
            environment = %config.environment,
            listeners = config.listeners.len(),
            "Configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_toml(
            r#"
environment = "test"

[collaborators]
timeout_ms = 75

[[listeners]]
name = "inputs"
queue = "inputs-queue"
routing_key = "input.created.#"

[[listeners]]
name = "replays"
queue = "replay-queue"
routing_key = "input.replayed.#"
channel_capacity = 8
"#,
        );

        let config = ConfigLoader::new()
            .with_env_prefix("PPTEST_FILE_ONLY")
            .with_file(file.path())
            .load()
            .unwrap();

        assert_eq!(config.environment, "test");
        assert_eq!(config.collaborators.timeout_ms, 75);
        assert_eq!(config.listeners.len(), 2);
        assert_eq!(config.listeners[0].channel_capacity, 256);
        assert_eq!(config.listeners[1].channel_capacity, 8);
        assert_eq!(config.listeners[1].tag(), "replays:replay-queue:input.replayed.#");
        // Untouched sections keep their defaults
        assert_eq!(config.store.staging_collection, "event_orders");
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_toml("[collaborators]\ntimeout_ms = 75\n");
        std::env::set_var("PPTEST_ENV_OVERRIDE__COLLABORATORS__TIMEOUT_MS", "250");

        let config = ConfigLoader::new()
            .with_env_prefix("PPTEST_ENV_OVERRIDE")
            .with_file(file.path())
            .load()
            .unwrap();
        std::env::remove_var("PPTEST_ENV_OVERRIDE__COLLABORATORS__TIMEOUT_MS");

        assert_eq!(config.collaborators.timeout_ms, 250);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/preprocessor.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Load { .. }));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let file = write_toml("[server]\nshutdown_timeout_ms = 0\n");
        let err = ConfigLoader::new()
            .with_env_prefix("PPTEST_INVALID")
            .with_file(file.path())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }
}
