//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the per-repository file;
//! values present in the repository file override the global ones key by key.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., excluded namespaces must be `refs/.../` prefixes).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// [visibility]
/// excluded_namespaces = ["refs/changes/", "refs/cache-automerge/"]
/// negative_cache_entries = 4096
///
/// [log]
/// page_size = 50
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Reachability policy settings
    pub visibility: Option<VisibilityConfig>,

    /// History listing settings
    pub log: Option<LogConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(visibility) = &self.visibility {
            visibility.validate()?;
        }
        if let Some(log) = &self.log {
            log.validate()?;
        }
        Ok(())
    }
}

/// Visibility settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VisibilityConfig {
    /// Ref namespaces whose tips never seed the ancestry search
    pub excluded_namespaces: Option<Vec<String>>,

    /// Upper bound on memoized negative answers
    pub negative_cache_entries: Option<usize>,
}

impl VisibilityConfig {
    /// Validate the visibility configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(namespaces) = &self.excluded_namespaces {
            for ns in namespaces {
                if !ns.starts_with("refs/") || !ns.ends_with('/') {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid excluded namespace '{}', must look like 'refs/<name>/'",
                        ns
                    )));
                }
                if ns == "refs/" || ns == "refs/heads/" || ns == "refs/tags/" {
                    return Err(ConfigError::InvalidValue(format!(
                        "namespace '{}' cannot be excluded",
                        ns
                    )));
                }
            }
        }
        Ok(())
    }
}

/// History listing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Commits per page
    pub page_size: Option<usize>,
}

impl LogConfig {
    /// Validate the log configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == Some(0) {
            return Err(ConfigError::InvalidValue(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
