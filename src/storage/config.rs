//! Configuration handling for mdsuite
//!
//! Configuration is stored in `mdsuite.toml` next to the documents (project)
//! and `~/.config/mdsuite/config.toml` (global). Command-line flags override
//! the project file, which overrides the global file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the project configuration file inside the input directory
pub const PROJECT_CONFIG_FILE: &str = "mdsuite.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Where generated artifacts go, relative to the input directory
    pub output_dir: Option<PathBuf>,

    /// Package path prefix of the generated suites
    pub module: Option<String>,

    /// Package providing the base suite and its runner
    pub runtime_import: Option<String>,

    /// Document file name to look for in each directory
    pub document: Option<String>,

    /// Directory names to skip while walking
    pub ignore: Option<Vec<String>>,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    pub module: Option<String>,
    pub runtime_import: Option<String>,
    pub document: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub module: Option<String>,
    pub runtime_import: Option<String>,
    pub document: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub module: String,
    pub runtime_import: Option<String>,
    pub document: String,
    pub ignore: Vec<String>,
}

impl Settings {
    /// Fails if the settings can't produce compiled suites
    pub fn require_module(&self) -> Result<&str, ConfigError> {
        if self.module.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "a module path is required for compiled suites; pass --module or set `module` in {}",
                PROJECT_CONFIG_FILE
            )));
        }
        Ok(&self.module)
    }
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub input_dir: PathBuf,
}

impl Config {
    /// Loads configuration for documents under `input_dir`
    pub fn load(input_dir: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(input_dir)?;

        Ok(Self {
            project,
            global,
            input_dir: input_dir.to_path_buf(),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "mdsuite", "mdsuite").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from the input directory
    fn load_project_config(input_dir: &Path) -> Result<ProjectConfig> {
        let config_path = input_dir.join(PROJECT_CONFIG_FILE);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Resolves the effective settings: flags, then project, then global, then defaults
    pub fn settings(&self, overrides: Overrides) -> Result<Settings, ConfigError> {
        let output_dir = overrides
            .output_dir
            .or_else(|| {
                self.project
                    .output_dir
                    .as_ref()
                    .map(|dir| self.input_dir.join(dir))
            })
            .unwrap_or_else(|| self.input_dir.clone());

        let module = overrides
            .module
            .or_else(|| self.project.module.clone())
            .or_else(|| self.global.module.clone())
            .unwrap_or_default();

        let runtime_import = overrides
            .runtime_import
            .or_else(|| self.project.runtime_import.clone())
            .or_else(|| self.global.runtime_import.clone());

        let document = overrides
            .document
            .or_else(|| self.project.document.clone())
            .or_else(|| self.global.document.clone())
            .unwrap_or_else(|| "README.md".to_string());

        if document.trim().is_empty() || document.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "document must be a plain file name, got '{}'",
                document
            )));
        }

        let ignore = self.project.ignore.clone().unwrap_or_else(|| {
            ["target", "node_modules"].iter().map(|s| s.to_string()).collect()
        });

        Ok(Settings {
            input_dir: self.input_dir.clone(),
            output_dir,
            module,
            runtime_import,
            document,
            ignore,
        })
    }
}
