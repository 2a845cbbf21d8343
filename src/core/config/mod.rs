//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Revgate has two configuration scopes:
//! - **Global**: Settings for every repository served by this instance
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$REVGATE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/revgate/config.toml`
//! 3. `~/.revgate/config.toml`
//!
//! # Repo Config Location
//!
//! `<git_dir>/revgate/config.toml`. Working-tree and bare repositories are
//! handled the same way since only the git directory is consulted.
//!
//! # Example
//!
//! ```no_run
//! use revgate::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/srv/git/project.git"))).unwrap();
//! let config = result.config;
//!
//! println!("Excluded: {:?}", config.excluded_namespaces());
//! println!("Page size: {}", config.page_size());
//! ```

pub mod schema;

pub use schema::{FileConfig, LogConfig, VisibilityConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Namespaces excluded from the default visible tip set.
///
/// Administrative change refs are excluded; everything else under `refs/`
/// (including configuration refs such as `refs/meta/config`) stays eligible.
pub const DEFAULT_EXCLUDED_NAMESPACES: &[&str] = &["refs/changes/"];

/// Default bound on memoized negative visibility answers.
pub const DEFAULT_NEGATIVE_CACHE_ENTRIES: usize = 1024;

/// Default number of commits per history page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. Repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: FileConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<FileConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads repo-specific config from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(git_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with(Self::global_config_location(), git_dir)
    }

    /// Load configuration from an explicit global file and git directory.
    pub fn load_with(
        global_path: Option<PathBuf>,
        git_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global = match &global_path {
            Some(path) => Self::read_config(path)?,
            None => FileConfig::default(),
        };

        let (repo, repo_path) = match git_dir {
            Some(dir) => Self::load_repo(dir, &mut warnings)?,
            None => (None, None),
        };

        // Validate loaded configs
        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path,
                repo_path,
            },
            warnings,
        })
    }

    /// Find the global configuration file, if any exists.
    fn global_config_location() -> Option<PathBuf> {
        // 1. Check $REVGATE_CONFIG
        if let Ok(path) = std::env::var("REVGATE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/revgate/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("revgate/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.revgate/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".revgate/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Load repository configuration from the git directory.
    fn load_repo(
        git_dir: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigError> {
        let path = Self::repo_config_path(git_dir);
        if path.exists() {
            let config = Self::read_config(&path)?;
            return Ok((Some(config), Some(path)));
        }

        // A file placed next to the expected directory is almost always a typo.
        let misplaced = git_dir.join("revgate.toml");
        if misplaced.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Ignoring config file. Please move it to '{}'",
                    path.display()
                ),
                path: misplaced,
            });
        }

        Ok((None, None))
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for repo config.
    ///
    /// Returns `revgate/config.toml` relative to the given git directory.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("revgate/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn visibility_value<T>(&self, get: impl Fn(&VisibilityConfig) -> Option<T>) -> Option<T> {
        let from_repo = self
            .repo
            .as_ref()
            .and_then(|r| r.visibility.as_ref())
            .and_then(&get);
        from_repo.or_else(|| self.global.visibility.as_ref().and_then(&get))
    }

    /// Ref namespaces excluded from the default visible tip set.
    ///
    /// Defaults to [`DEFAULT_EXCLUDED_NAMESPACES`].
    pub fn excluded_namespaces(&self) -> Vec<String> {
        self.visibility_value(|v| v.excluded_namespaces.clone())
            .unwrap_or_else(|| {
                DEFAULT_EXCLUDED_NAMESPACES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
    }

    /// Upper bound on memoized negative visibility answers.
    ///
    /// Defaults to [`DEFAULT_NEGATIVE_CACHE_ENTRIES`].
    pub fn negative_cache_entries(&self) -> usize {
        self.visibility_value(|v| v.negative_cache_entries)
            .unwrap_or(DEFAULT_NEGATIVE_CACHE_ENTRIES)
    }

    /// Number of commits per history page.
    ///
    /// Defaults to [`DEFAULT_PAGE_SIZE`].
    pub fn page_size(&self) -> usize {
        let get = |c: &FileConfig| c.log.as_ref().and_then(|l| l.page_size);
        self.repo
            .as_ref()
            .and_then(get)
            .or_else(|| get(&self.global))
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
