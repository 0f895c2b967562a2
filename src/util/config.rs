//! Configuration file support for importkit.
//!
//! Two configuration file locations are read:
//! - Global: `config.toml` in the platform config directory for importkit
//! - Project: `.importkit/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::loader::capabilities::CacheRequirement;
use crate::loader::request::AUTO_LOADER;

/// importkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Import request defaults
    pub import: ImportConfig,

    /// Host runtime and probe settings
    pub probe: ProbeConfig,
}

/// Defaults for import requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Default loader (auto, native, hook-transpile, bundled-runner, bundle-to-temp)
    pub loader: Option<String>,

    /// Default cache requirement (must-cache, must-not-cache, indifferent)
    pub cache: Option<CacheRequirement>,

    /// Ask engines for dependency lists by default
    pub list_dependencies: bool,

    /// Skip capability validation by default
    pub bypass_validation: bool,
}

impl ImportConfig {
    /// Configured loader, `auto` when unset.
    pub fn loader(&self) -> &str {
        self.loader.as_deref().unwrap_or(AUTO_LOADER)
    }

    /// Configured cache requirement, must-cache when unset.
    pub fn cache(&self) -> CacheRequirement {
        self.cache.unwrap_or_default()
    }
}

/// Host runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Fixture imported to detect native support (defaults to the bundled one)
    pub fixture: Option<PathBuf>,

    /// Host runtime executable (defaults to `node` on PATH)
    pub node: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.import.loader.is_some() {
            self.import.loader = other.import.loader;
        }
        if other.import.cache.is_some() {
            self.import.cache = other.import.cache;
        }
        if other.import.list_dependencies {
            self.import.list_dependencies = true;
        }
        if other.import.bypass_validation {
            self.import.bypass_validation = true;
        }

        if other.probe.fixture.is_some() {
            self.probe.fixture = other.probe.fixture;
        }
        if other.probe.node.is_some() {
            self.probe.node = other.probe.node;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.importkit/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Load configuration for the current directory.
pub fn load_default_config() -> Config {
    let cwd = std::env::current_dir().unwrap_or_default();
    let global = global_config_path();
    load_config(global.as_deref(), &project_config_path(&cwd))
}

/// Get the global config path.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "importkit", "importkit").map(|d| d.config_dir().join("config.toml"))
}

/// Get the project config path (.importkit/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".importkit").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
            [import]
            loader = "bundled-runner"
            cache = "must-not-cache"
            list_dependencies = true

            [probe]
            node = "/opt/node/bin/node"
            "#,
        )
        .unwrap();

        assert_eq!(config.import.loader(), "bundled-runner");
        assert_eq!(config.import.cache(), CacheRequirement::MustNotCache);
        assert!(config.import.list_dependencies);
        assert!(!config.import.bypass_validation);
        assert_eq!(config.probe.node, Some(PathBuf::from("/opt/node/bin/node")));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.import.loader(), "auto");
        assert_eq!(config.import.cache(), CacheRequirement::MustCache);
        assert!(config.probe.fixture.is_none());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());

        Config {
            import: ImportConfig {
                loader: Some("native".to_string()),
                cache: Some(CacheRequirement::Indifferent),
                ..Default::default()
            },
            ..Default::default()
        }
        .save(&global)
        .unwrap();

        Config {
            import: ImportConfig {
                loader: Some("bundle-to-temp".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
        .save(&project)
        .unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.import.loader(), "bundle-to-temp");
        assert_eq!(config.import.cache(), CacheRequirement::Indifferent);
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "import = 5").unwrap();
        assert_eq!(Config::load_or_default(&path), Config::default());
        assert!(Config::load(&path).is_err());
    }
}
