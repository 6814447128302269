//! High-level configuration structure for weft.
//!
//! This module provides the main `WeftConfig` struct, profile merging and the
//! end-to-end plan resolution. For file discovery, see the `discovery` module.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result as ConfigResult};
use crate::manifest::{ManifestSource, compose};
use crate::mode::BuildContext;
use crate::pipeline::{
    CompilerBridgeOptions, CompilerBridgePlugin, CompressionOptions, PipelinePlan,
    PipelineSettings, PluginSpec, PreviewOptions, PwaInjectPlugin, ServerOptions, assemble,
};
use crate::proxy::{ProxyRuleConfig, ProxyTable};
use crate::service_worker::ServiceWorkerOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeftConfig {
    /// Bundler root; relative paths in the bundler's own config resolve against it
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Output directory, relative to `root`
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default)]
    pub server: ServerOptions,

    #[serde(default)]
    pub preview: PreviewOptions,

    pub compiler: CompilerBridgeOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_worker: Option<ServiceWorkerOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestSource>,

    #[serde(default)]
    pub compression: CompressionOptions,

    /// Dev proxy rules, first match wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxy: Vec<ProxyRuleConfig>,

    /// Named overrides deep-merged over the rest of the file
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Value>,
}

impl WeftConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use weft_config::WeftConfig;
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "compiler": { "project_id": "webapp", "uri_prefix": "compiled" }
    /// });
    ///
    /// let config = WeftConfig::from_value(value).unwrap();
    /// assert_eq!(config.compiler.project_id, "webapp");
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Apply a named profile. Objects merge key by key; arrays and scalars replace.
    pub fn materialize_profile(self, profile: Option<&str>) -> ConfigResult<Self> {
        let Some(name) = profile else {
            return Ok(self);
        };

        let Some(overrides) = self.profiles.get(name).cloned() else {
            return Err(ConfigError::UnknownProfile {
                name: name.to_string(),
                available: self.profile_names(),
            });
        };

        if !overrides.is_object() && !overrides.is_null() {
            return Err(ConfigError::InvalidProfileOverride {
                message: format!("profile '{name}' must be a table"),
            });
        }

        let mut base = serde_json::to_value(&self).map_err(|err| {
            ConfigError::InvalidProfileOverride {
                message: err.to_string(),
            }
        })?;
        merge_values(&mut base, &overrides);

        let mut merged: WeftConfig = serde_json::from_value(base).map_err(|err| {
            ConfigError::InvalidProfileOverride {
                message: format!("profile '{name}': {err}"),
            }
        })?;
        // Profiles cannot redefine profiles.
        merged.profiles = self.profiles;

        tracing::debug!(profile = name, "applied config profile");
        Ok(merged)
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            root: self.root.clone(),
            out_dir: self.out_dir.clone(),
            server: self.server.clone(),
            preview: self.preview.clone(),
        }
    }

    /// Run every component for one invocation and assemble the plan.
    pub fn resolve_plan(&self, context: BuildContext) -> ConfigResult<PipelinePlan> {
        let variant = context.artifact_variant();

        let proxy = ProxyTable::build(self.proxy.iter().cloned())?;

        self.compiler.validate()?;
        let mut plugins = vec![PluginSpec::CompilerBridge(CompilerBridgePlugin {
            options: self.compiler.clone(),
            variant,
        })];

        match (&self.service_worker, &self.manifest) {
            (Some(service_worker), Some(manifest)) => {
                let manifest = compose(manifest.clone())?;
                let service_worker = service_worker.plan(context.mode, variant)?;
                plugins.push(PluginSpec::PwaInject(PwaInjectPlugin {
                    service_worker,
                    manifest,
                }));
            }
            (Some(_), None) => {
                return Err(ConfigError::MissingField {
                    field: "manifest".to_string(),
                    hint: "A service worker is configured; add a [manifest] section or remove [service_worker]"
                        .to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingField {
                    field: "service_worker".to_string(),
                    hint: "A manifest is configured; add a [service_worker] section or remove [manifest]"
                        .to_string(),
                });
            }
            (None, None) => {}
        }

        if self.compression.enabled {
            self.compression.validate()?;
            plugins.push(PluginSpec::Compression(self.compression.clone()));
        }

        assemble(context, self.settings(), proxy, plugins)
    }
}

/// Resolve the plan for `context` from a loaded config.
pub fn resolve_plan(config: &WeftConfig, context: BuildContext) -> ConfigResult<PipelinePlan> {
    config.resolve_plan(context)
}

fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}
