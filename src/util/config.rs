//! Configuration file support for sasspiler.
//!
//! sasspiler supports two configuration file locations:
//! - Global: `~/.sasspiler/config.toml` - User-wide defaults
//! - Project: `.sasspiler/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config; command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::executor::Schedule;
use crate::builder::sass::{OutputStyle, DEFAULT_PROGRAM};

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".sasspiler";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// sasspiler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Batch settings
    pub build: BuildConfig,

    /// Compiler settings
    pub compiler: CompilerConfig,
}

/// Batch-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of parallel workers (implies a parallel schedule)
    pub jobs: Option<usize>,

    /// Convert files in parallel
    #[serde(default)]
    pub parallel: bool,

    /// Extra directories searched for imports
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
}

/// Compiler-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Sass executable name or path (default: `sass`)
    pub program: Option<String>,

    /// Output style (expanded, compressed)
    pub style: Option<String>,
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

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.parallel {
            self.build.parallel = true;
        }
        if !other.build.include_paths.is_empty() {
            self.build.include_paths = other.build.include_paths;
        }

        // Compiler settings
        if other.compiler.program.is_some() {
            self.compiler.program = other.compiler.program;
        }
        if other.compiler.style.is_some() {
            self.compiler.style = other.compiler.style;
        }
    }

    /// Parse the output style from the config string.
    pub fn style(&self) -> Option<OutputStyle> {
        self.compiler.style.as_ref().and_then(|s| s.parse().ok())
    }

    /// The Sass executable to run.
    pub fn program(&self) -> &str {
        self.compiler.program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    /// The batch schedule these settings ask for.
    pub fn schedule(&self) -> Schedule {
        if self.build.parallel || self.build.jobs.is_some() {
            Schedule::Parallel {
                jobs: self.build.jobs,
            }
        } else {
            Schedule::Sequential
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.sasspiler/config.toml)
/// 2. Global config (~/.sasspiler/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global sasspiler config directory (~/.sasspiler).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the project config path (.sasspiler/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}
