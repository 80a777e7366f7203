//! Configuration: salt, environment and database location.
//!
//! Sources are merged in order of precedence (highest last):
//!
//! 1. Built-in defaults
//! 2. Project config (`tamperlog.toml` in the project directory)
//! 3. Environment variables (`TAMPERLOG_*`, `__` between nested keys)
//!
//! ```text
//! TAMPERLOG_ENVIRONMENT=production
//! TAMPERLOG_SALT=...
//! TAMPERLOG_DATABASE__PATH=/var/lib/app/chain.db
//! TAMPERLOG_DATABASE__TABLE=messages
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tamperlog_core::{Salt, SaltError};
use thiserror::Error;

/// Salt used when none is configured outside production.
///
/// It is public, so digests made with it prove nothing to anyone who can
/// write the database.
pub const DEVELOPMENT_SALT: &str = "83efedfccc510d78016e6f247b93f28aa20de95a";

/// Name of the project config file.
pub const CONFIG_FILE: &str = "tamperlog.toml";

/// Configuration errors that make a chain unsafe to open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no salt configured; set TAMPERLOG_SALT in production")]
    MissingSalt,

    #[error("the development salt must not be used in production")]
    InsecureSalt,

    #[error("invalid salt: {0}")]
    InvalidSalt(#[from] SaltError),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Top-level configuration.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub environment: Environment,
    /// Secret mixed into every digest. Must not change for the lifetime of a chain.
    pub salt: Option<String>,
    pub database: DatabaseConfig,
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("environment", &self.environment)
            .field("salt", &self.salt.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

/// Where the chain is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. `None` keeps the chain in memory.
    pub path: Option<PathBuf>,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            table: tamperlog_store::DEFAULT_TABLE.to_string(),
        }
    }
}

impl ChainConfig {
    /// The salt digests are computed with.
    ///
    /// Falls back to [`DEVELOPMENT_SALT`] outside production, with a warning.
    pub fn salt(&self) -> std::result::Result<Salt, ConfigError> {
        match (&self.salt, self.environment) {
            (Some(salt), Environment::Production) if salt == DEVELOPMENT_SALT => {
                Err(ConfigError::InsecureSalt)
            }
            (Some(salt), _) => Ok(Salt::new(salt)?),
            (None, Environment::Production) => Err(ConfigError::MissingSalt),
            (None, Environment::Development) => {
                tracing::warn!("no salt configured, using the development salt");
                Ok(Salt::new(DEVELOPMENT_SALT)?)
            }
        }
    }

    fn resolve_paths(&mut self, project_dir: &Path) {
        if let Some(path) = &self.database.path {
            if path.is_relative() {
                self.database.path = Some(project_dir.join(path));
            }
        }
    }
}

/// Configuration loader with builder pattern.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader rooted at the current directory.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "TAMPERLOG".to_string(),
        }
    }

    /// Set the project directory.
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "TAMPERLOG").
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources with proper precedence.
    pub fn load(self) -> Result<ChainConfig> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ChainConfig::default())?);

        let project_file = self.project_dir.join(CONFIG_FILE);
        if project_file.exists() {
            builder = builder.add_source(
                config::File::from(project_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut chain_config: ChainConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        chain_config.resolve_paths(&self.project_dir);

        Ok(chain_config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn loader(dir: &Path) -> ConfigLoader {
        // A prefix nothing in the test environment sets.
        ConfigLoader::new()
            .with_project_dir(dir)
            .with_env_prefix("TAMPERLOG_UNIT_TEST_UNSET")
    }

    #[test]
    fn test_debug_redacts_salt() {
        let config = ChainConfig {
            salt: Some("hunter2-salt".into()),
            ..ChainConfig::default()
        };
        let shown = format!("{:?}", config);
        assert!(!shown.contains("hunter2-salt"), "{}", shown);
        assert!(shown.contains("<redacted>"));

        let shown = format!("{:?}", ChainConfig::default());
        assert!(shown.contains("salt: None"), "{}", shown);
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = loader(temp_dir.path()).load().unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.salt, None);
        assert_eq!(config.database.path, None);
        assert_eq!(config.database.table, "chain_records");
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"
environment = "production"
salt = "project-salt"

[database]
path = "data/chain.db"
table = "messages"
"#,
        )
        .unwrap();

        let config = loader(temp_dir.path()).load().unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.salt.as_deref(), Some("project-salt"));
        assert_eq!(config.database.table, "messages");
        assert_eq!(
            config.database.path,
            Some(temp_dir.path().join("data/chain.db"))
        );
    }

    #[test]
    fn test_absolute_path_kept() {
        let temp_dir = tempdir().unwrap();
        let absolute = temp_dir.path().join("abs.db");
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            format!("[database]\npath = {:?}\n", absolute.display().to_string()),
        )
        .unwrap();

        let config = loader(temp_dir.path()).load().unwrap();
        assert_eq!(config.database.path, Some(absolute));
    }

    #[test]
    fn test_development_falls_back_to_development_salt() {
        let config = ChainConfig::default();
        let salt = config.salt().unwrap();
        assert!(salt.matches(DEVELOPMENT_SALT));
    }

    #[test]
    fn test_production_requires_salt() {
        let config = ChainConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert_eq!(config.salt().unwrap_err(), ConfigError::MissingSalt);
    }

    #[test]
    fn test_production_rejects_development_salt() {
        let config = ChainConfig {
            environment: Environment::Production,
            salt: Some(DEVELOPMENT_SALT.to_string()),
            ..Default::default()
        };
        assert_eq!(config.salt().unwrap_err(), ConfigError::InsecureSalt);
    }

    #[test]
    fn test_blank_salt_rejected() {
        let config = ChainConfig {
            salt: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.salt().unwrap_err(),
            ConfigError::InvalidSalt(SaltError::Empty)
        );
    }

    #[test]
    fn test_configured_salt_used() {
        let config = ChainConfig {
            environment: Environment::Production,
            salt: Some("s3cret".to_string()),
            ..Default::default()
        };
        assert!(config.salt().unwrap().matches("s3cret"));
    }
}
