//! File-based config discovery for CLI use
//!
//! Handles finding `weft.toml` and layering `WEFT_`-prefixed environment
//! variables over it. Nested keys use `__` as the separator, so
//! `WEFT_SERVICE_WORKER__MAX_CACHEABLE_BYTES` overrides
//! `service_worker.max_cacheable_bytes`.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde_json::Value;

use crate::config::WeftConfig;
use crate::error::{ConfigError, Result};

pub const CONFIG_FILE_NAME: &str = "weft.toml";
pub const ENV_PREFIX: &str = "WEFT_";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use weft_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find `weft.toml` in the root directory
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE_NAME);
        path.is_file().then_some(path)
    }

    /// Load config from the discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<WeftConfig> {
        let path = self.find().ok_or_else(|| ConfigError::NotFound {
            root: self.root.clone(),
        })?;
        load_from(&path)
    }

    /// Load config with profile merging
    pub fn load_with_profile(&self, profile: &str) -> Result<WeftConfig> {
        self.load()?.materialize_profile(Some(profile))
    }
}

/// Load a specific config file, with environment overrides applied on top.
pub fn load_from(path: &Path) -> Result<WeftConfig> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            root: path.to_path_buf(),
        });
    }

    tracing::debug!(path = %path.display(), "loading config");

    let value: Value = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::InvalidValue {
            field: path.display().to_string(),
            hint: Some(e.to_string()),
        })?;

    WeftConfig::from_value(value)
}
