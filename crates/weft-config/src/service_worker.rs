//! Service worker injection planning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{ConfigError, Result};
use crate::mode::{ArtifactVariant, Mode};

/// Placeholder in `source_template` replaced by the artifact variant suffix.
pub const VARIANT_PLACEHOLDER: &str = "{variant}";

const FIELD: &str = "service_worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwStrategy {
    /// Inject the precache manifest into a provided worker script
    #[default]
    InjectManifest,
    /// Generate the whole worker
    GenerateSw,
}

/// How the registration snippet is added to the page. Absent means the app registers itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectRegister {
    Inline,
    Script,
    Auto,
}

/// `[service_worker]` section of `weft.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWorkerOptions {
    /// Path of the compiled worker, with `{variant}` where the variant suffix goes
    pub source_template: String,

    #[serde(default = "default_filename")]
    pub filename: String,

    #[serde(default)]
    pub strategy: SwStrategy,

    /// Largest file the worker will precache. Required, never defaulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cacheable_bytes: Option<u64>,

    /// Run the worker under the dev server too
    #[serde(default)]
    pub dev_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_register: Option<InjectRegister>,
}

impl ServiceWorkerOptions {
    pub fn new(source_template: impl Into<String>, max_cacheable_bytes: u64) -> Self {
        Self {
            source_template: source_template.into(),
            filename: default_filename(),
            strategy: SwStrategy::default(),
            max_cacheable_bytes: Some(max_cacheable_bytes),
            dev_enabled: false,
            inject_register: None,
        }
    }

    /// Compute the worker plan for one invocation.
    pub fn plan(&self, mode: Mode, variant: ArtifactVariant) -> Result<ServiceWorkerPlan> {
        if !self.source_template.contains(VARIANT_PLACEHOLDER) {
            return Err(ConfigError::schema_with_hint(
                format!("{FIELD}.source_template"),
                format!("'{}' has no {VARIANT_PLACEHOLDER} placeholder", self.source_template),
                "The source path differs per mode; mark where the variant suffix goes, e.g. \"../worker/target/worker-{variant}\"",
            ));
        }

        let max_cacheable_bytes = self.max_cacheable_bytes.ok_or_else(|| ConfigError::MissingField {
            field: format!("{FIELD}.max_cacheable_bytes"),
            hint: "Set it above the largest asset the build emits, e.g. max_cacheable_bytes = 18000000"
                .to_string(),
        })?;
        if max_cacheable_bytes == 0 {
            return Err(ConfigError::schema(
                format!("{FIELD}.max_cacheable_bytes"),
                "must be greater than zero",
            ));
        }

        validate_filename(&self.filename)?;

        let source_path = PathBuf::from(
            self.source_template
                .replace(VARIANT_PLACEHOLDER, variant.suffix()),
        );

        let plan = ServiceWorkerPlan {
            source_path,
            output_filename: self.filename.clone(),
            strategy: self.strategy,
            max_cacheable_bytes,
            dev_enabled: self.dev_enabled && mode == Mode::Serve,
            inject_register: self.inject_register,
        };

        tracing::debug!(
            %mode,
            %variant,
            source = %plan.source_path.display(),
            max_cacheable_bytes,
            "planned service worker"
        );

        Ok(plan)
    }
}

fn validate_filename(filename: &str) -> Result<()> {
    let bare = !filename.is_empty()
        && !filename.contains(['/', '\\'])
        && filename != ".js"
        && filename.ends_with(".js");
    if !bare {
        return Err(ConfigError::schema_with_hint(
            format!("{FIELD}.filename"),
            format!("'{filename}' is not a bare .js file name"),
            "Use a file name such as \"sw.js\"; the output directory is configured separately",
        ));
    }
    Ok(())
}

fn default_filename() -> String {
    "sw.js".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWorkerPlan {
    pub source_path: PathBuf,
    pub output_filename: String,
    pub strategy: SwStrategy,
    pub max_cacheable_bytes: u64,
    /// Effective for this invocation: always false outside serve mode
    pub dev_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_register: Option<InjectRegister>,
}

impl ServiceWorkerPlan {
    /// Check that the compiled worker exists. `base` is the bundler root the path is relative to.
    pub fn verify_source(&self, base: &Path) -> Result<PathBuf> {
        let path = base.join(&self.source_path);
        if !path.exists() {
            return Err(ConfigError::MissingArtifact { path });
        }
        Ok(path)
    }

    /// Fail when any asset is larger than the precache ceiling, naming the largest offender.
    pub fn check_assets<'a>(&self, assets: impl IntoIterator<Item = &'a AssetSize>) -> Result<()> {
        let largest = assets
            .into_iter()
            .filter(|asset| asset.bytes > self.max_cacheable_bytes)
            .max_by_key(|asset| asset.bytes);

        match largest {
            Some(asset) => Err(ConfigError::CeilingTooLow {
                asset: asset.path.clone(),
                size: asset.bytes,
                ceiling: self.max_cacheable_bytes,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSize {
    pub path: PathBuf,
    pub bytes: u64,
}

impl AssetSize {
    pub fn new(path: impl Into<PathBuf>, bytes: u64) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

/// Sizes of every file under `dir`, sorted by path.
pub fn scan_assets(dir: &Path) -> Result<Vec<AssetSize>> {
    if !dir.is_dir() {
        return Err(ConfigError::AssetsNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let bytes = entry.metadata().map_err(std::io::Error::from)?.len();
        assets.push(AssetSize::new(entry.into_path(), bytes));
    }
    tracing::debug!(dir = %dir.display(), count = assets.len(), "scanned assets");
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TEMPLATE: &str = "../serviceworker/target/worker-{variant}";

    #[test]
    fn serve_plan_uses_fastopt() {
        let plan = ServiceWorkerOptions::new(TEMPLATE, 12_000_000)
            .plan(Mode::Serve, ArtifactVariant::Fast)
            .unwrap();
        assert_eq!(
            plan.source_path,
            PathBuf::from("../serviceworker/target/worker-fastopt")
        );
        assert_eq!(plan.output_filename, "sw.js");
        assert_eq!(plan.strategy, SwStrategy::InjectManifest);
    }

    #[test]
    fn build_plan_uses_opt() {
        let plan = ServiceWorkerOptions::new(TEMPLATE, 12_000_000)
            .plan(Mode::Build, ArtifactVariant::Optimized)
            .unwrap();
        let path = plan.source_path.to_string_lossy().into_owned();
        assert!(path.ends_with("worker-opt"));
        assert!(!path.contains("fastopt"));
    }

    #[test]
    fn dev_enabled_only_in_serve() {
        let mut options = ServiceWorkerOptions::new(TEMPLATE, 1);
        options.dev_enabled = true;
        assert!(options.plan(Mode::Serve, ArtifactVariant::Fast).unwrap().dev_enabled);
        assert!(!options.plan(Mode::Build, ArtifactVariant::Optimized).unwrap().dev_enabled);
    }

    #[test]
    fn missing_ceiling_is_an_error() {
        let mut options = ServiceWorkerOptions::new(TEMPLATE, 1);
        options.max_cacheable_bytes = None;
        let err = options.plan(Mode::Build, ArtifactVariant::Optimized).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
        assert_eq!(err.field(), Some("service_worker.max_cacheable_bytes"));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let options = ServiceWorkerOptions::new("../worker/target/worker-opt", 1);
        let err = options.plan(Mode::Build, ArtifactVariant::Optimized).unwrap_err();
        assert_eq!(err.field(), Some("service_worker.source_template"));
    }

    #[test]
    fn filename_must_be_bare_js() {
        for bad in ["", "dist/sw.js", "sw.ts", ".js"] {
            let mut options = ServiceWorkerOptions::new(TEMPLATE, 1);
            options.filename = bad.to_string();
            assert!(
                options.plan(Mode::Serve, ArtifactVariant::Fast).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn ceiling_below_largest_asset_is_flagged() {
        let plan = ServiceWorkerOptions::new(TEMPLATE, 1_000)
            .plan(Mode::Build, ArtifactVariant::Optimized)
            .unwrap();
        let assets = [
            AssetSize::new("index.html", 400),
            AssetSize::new("app.wasm", 5_000),
            AssetSize::new("app.js", 2_000),
        ];
        match plan.check_assets(&assets).unwrap_err() {
            ConfigError::CeilingTooLow { asset, size, ceiling } => {
                assert_eq!(asset, PathBuf::from("app.wasm"));
                assert_eq!(size, 5_000);
                assert_eq!(ceiling, 1_000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ceiling_equal_to_largest_asset_passes() {
        let plan = ServiceWorkerOptions::new(TEMPLATE, 5_000)
            .plan(Mode::Build, ArtifactVariant::Optimized)
            .unwrap();
        let assets = [AssetSize::new("app.wasm", 5_000), AssetSize::new("a.js", 1)];
        assert!(plan.check_assets(&assets).is_ok());
    }

    #[test]
    fn verify_source_reports_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let plan = ServiceWorkerOptions::new("target/worker-{variant}", 1)
            .plan(Mode::Build, ArtifactVariant::Optimized)
            .unwrap();

        match plan.verify_source(dir.path()).unwrap_err() {
            ConfigError::MissingArtifact { path } => assert!(path.ends_with("target/worker-opt")),
            other => panic!("unexpected error: {other}"),
        }

        fs::create_dir_all(dir.path().join("target/worker-opt")).unwrap();
        assert!(plan.verify_source(dir.path()).is_ok());
    }

    #[test]
    fn scan_assets_walks_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("assets/app.js"), vec![b'x'; 2048]).unwrap();

        let assets = scan_assets(dir.path()).unwrap();
        assert_eq!(assets.len(), 2);
        let js = assets.iter().find(|a| a.path.ends_with("app.js")).unwrap();
        assert_eq!(js.bytes, 2048);
    }

    #[test]
    fn scan_assets_names_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("dist");
        match scan_assets(&missing).unwrap_err() {
            ConfigError::AssetsNotFound { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
