//! Pluggable plan validation strategies
//!
//! Separates structural checks on an assembled plan from checks that need the
//! filesystem (compiled worker present, emitted assets under the cache ceiling).

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::pipeline::PipelinePlan;
use crate::service_worker::scan_assets;

/// Trait for pluggable plan validation strategies
pub trait PlanValidator {
    fn validate(&self, plan: &PipelinePlan) -> Result<()>;
}

/// Structural validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use weft_config::{BuildContext, PlanValidator, SchemaValidator, WeftConfig};
/// use serde_json::json;
///
/// let config = WeftConfig::from_value(json!({
///     "compiler": { "project_id": "webapp", "uri_prefix": "compiled" }
/// }))
/// .unwrap();
/// let plan = config.resolve_plan(BuildContext::build()).unwrap();
///
/// SchemaValidator.validate(&plan).unwrap();
/// ```
pub struct SchemaValidator;

impl PlanValidator for SchemaValidator {
    fn validate(&self, plan: &PipelinePlan) -> Result<()> {
        plan.verify_order()?;

        if plan.out_dir.as_os_str().is_empty() {
            return Err(ConfigError::schema("out_dir", "cannot be empty"));
        }

        if let (Some(server), Some(preview)) = (plan.server.port, plan.preview.port) {
            if server == preview {
                return Err(ConfigError::schema_with_hint(
                    "preview.port",
                    format!("port {preview} is also used by the dev server"),
                    "Give the preview server its own port",
                ));
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// `base` is the project directory holding `weft.toml`; the plan's `root` and the
/// worker source path resolve against it.
///
/// # Example
///
/// ```no_run
/// use weft_config::{BuildContext, ConfigDiscovery, FsValidator, PlanValidator};
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// let plan = config.resolve_plan(BuildContext::build()).unwrap();
/// FsValidator::new(".").with_assets("web/dist").validate(&plan).unwrap();
/// ```
pub struct FsValidator {
    base: PathBuf,
    assets_dir: Option<PathBuf>,
}

impl FsValidator {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            assets_dir: None,
        }
    }

    /// Also check every file under `dir` against the precache ceiling.
    pub fn with_assets(mut self, dir: impl AsRef<Path>) -> Self {
        self.assets_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl PlanValidator for FsValidator {
    fn validate(&self, plan: &PipelinePlan) -> Result<()> {
        SchemaValidator.validate(plan)?;

        let root = self.base.join(&plan.root);
        if !root.is_dir() {
            return Err(ConfigError::RootNotFound { path: root });
        }

        let Some(service_worker) = plan.service_worker() else {
            return Ok(());
        };

        let source = service_worker.verify_source(&root)?;
        tracing::debug!(source = %source.display(), "service worker source present");

        if let Some(dir) = &self.assets_dir {
            let dir = self.base.join(dir);
            let assets = scan_assets(&dir)?;
            service_worker.check_assets(&assets)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeftConfig;
    use crate::mode::BuildContext;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn plan(extra: serde_json::Value) -> PipelinePlan {
        let mut value = json!({
            "root": "web",
            "compiler": { "project_id": "webapp", "uri_prefix": "compiled" },
            "service_worker": {
                "source_template": "../worker/worker-{variant}",
                "max_cacheable_bytes": 1000
            },
            "manifest": {
                "name": "App",
                "short_name": "App",
                "icons": [{ "src": "/icon.png", "sizes": "192x192", "type": "image/png" }]
            }
        });
        if let (Some(target), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            for (key, val) in extra {
                target.insert(key.clone(), val.clone());
            }
        }
        WeftConfig::from_value(value)
            .unwrap()
            .resolve_plan(BuildContext::build())
            .unwrap()
    }

    #[test]
    fn schema_validator_accepts_resolved_plan() {
        assert!(SchemaValidator.validate(&plan(json!({}))).is_ok());
    }

    #[test]
    fn schema_validator_rejects_port_clash() {
        let plan = plan(json!({ "server": { "port": 8090 }, "preview": { "port": 8090 } }));
        let err = SchemaValidator.validate(&plan).unwrap_err();
        assert_eq!(err.field(), Some("preview.port"));
    }

    #[test]
    fn fs_validator_requires_root() {
        let dir = TempDir::new().unwrap();
        let err = FsValidator::new(dir.path()).validate(&plan(json!({}))).unwrap_err();
        assert!(matches!(err, ConfigError::RootNotFound { .. }));
    }

    #[test]
    fn fs_validator_requires_worker_source() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("web")).unwrap();
        let err = FsValidator::new(dir.path()).validate(&plan(json!({}))).unwrap_err();
        match err {
            ConfigError::MissingArtifact { path } => assert!(path.ends_with("worker-opt")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fs_validator_checks_assets() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("web/dist")).unwrap();
        fs::create_dir_all(dir.path().join("worker/worker-opt")).unwrap();
        fs::write(dir.path().join("web/dist/small.js"), vec![b'a'; 10]).unwrap();

        let plan = plan(json!({}));
        let validator = FsValidator::new(dir.path()).with_assets("web/dist");
        assert!(validator.validate(&plan).is_ok());

        fs::write(dir.path().join("web/dist/big.wasm"), vec![0u8; 4096]).unwrap();
        let err = validator.validate(&plan).unwrap_err();
        match err {
            ConfigError::CeilingTooLow { asset, .. } => assert!(asset.ends_with("big.wasm")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
