//! Plugin chain assembly.
//!
//! Plugin order is never taken from the input. Each plugin kind declares which
//! kinds must run before it, and the chain is the topological order of that
//! graph restricted to the plugins actually configured.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::manifest::ManifestDescriptor;
use crate::mode::{ArtifactVariant, BuildContext};
use crate::proxy::ProxyTable;
use crate::service_worker::ServiceWorkerPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginKind {
    /// Exposes the compiled secondary-language module to the bundler
    CompilerBridge,
    /// Emits the manifest and injects the precache list into the worker
    PwaInject,
    /// Compresses emitted assets
    Compression,
}

impl PluginKind {
    pub fn name(self) -> &'static str {
        match self {
            PluginKind::CompilerBridge => "compiler-bridge",
            PluginKind::PwaInject => "pwa-inject",
            PluginKind::Compression => "compression",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(earlier, later)`: when both are present, `earlier` runs first.
const RUNS_BEFORE: &[(PluginKind, PluginKind)] = &[
    (PluginKind::CompilerBridge, PluginKind::PwaInject),
    (PluginKind::PwaInject, PluginKind::Compression),
    (PluginKind::CompilerBridge, PluginKind::Compression),
];

/// `(plugin, dependency)`: `plugin` consumes output only `dependency` produces.
const REQUIRES: &[(PluginKind, PluginKind)] =
    &[(PluginKind::PwaInject, PluginKind::CompilerBridge)];

/// `[compiler]` section of `weft.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerBridgeOptions {
    /// Directory holding the secondary-language build
    #[serde(default = "default_compiler_cwd")]
    pub cwd: PathBuf,

    /// Project within that build whose linked output is consumed
    pub project_id: String,

    /// Import prefix the bridge intercepts (`<prefix>:module`)
    pub uri_prefix: String,
}

impl CompilerBridgeOptions {
    pub fn new(project_id: impl Into<String>, uri_prefix: impl Into<String>) -> Self {
        Self {
            cwd: default_compiler_cwd(),
            project_id: project_id.into(),
            uri_prefix: uri_prefix.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::schema("compiler.project_id", "cannot be empty"));
        }
        let prefix_ok = !self.uri_prefix.is_empty()
            && self
                .uri_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !prefix_ok {
            return Err(ConfigError::schema_with_hint(
                "compiler.uri_prefix",
                format!("'{}' is not a valid import prefix", self.uri_prefix),
                "Use letters, digits, '-' or '_' only; the ':' separator is added automatically",
            ));
        }
        Ok(())
    }
}

fn default_compiler_cwd() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerBridgePlugin {
    #[serde(flatten)]
    pub options: CompilerBridgeOptions,
    pub variant: ArtifactVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwaInjectPlugin {
    pub service_worker: ServiceWorkerPlan,
    pub manifest: ManifestDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    #[default]
    Gzip,
    Brotli,
    Deflate,
}

impl CompressionAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
            CompressionAlgorithm::Brotli => "brotli",
            CompressionAlgorithm::Deflate => "deflate",
        }
    }

    pub fn default_ext(self) -> &'static str {
        match self {
            CompressionAlgorithm::Gzip => ".gz",
            CompressionAlgorithm::Brotli => ".br",
            CompressionAlgorithm::Deflate => ".deflate",
        }
    }
}

/// `[compression]` section of `weft.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionOptions {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub algorithm: CompressionAlgorithm,

    /// Files smaller than this many bytes are left alone
    #[serde(default = "default_threshold")]
    pub threshold: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: CompressionAlgorithm::default(),
            threshold: default_threshold(),
            ext: None,
        }
    }
}

impl CompressionOptions {
    pub fn ext(&self) -> &str {
        self.ext
            .as_deref()
            .unwrap_or_else(|| self.algorithm.default_ext())
    }

    pub fn validate(&self) -> Result<()> {
        let ext = self.ext();
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::schema(
                "compression.ext",
                format!("'{ext}' must be a file extension starting with '.'"),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> u64 {
    1025
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum PluginSpec {
    CompilerBridge(CompilerBridgePlugin),
    PwaInject(PwaInjectPlugin),
    Compression(CompressionOptions),
}

impl PluginSpec {
    pub fn kind(&self) -> PluginKind {
        match self {
            PluginSpec::CompilerBridge(_) => PluginKind::CompilerBridge,
            PluginSpec::PwaInject(_) => PluginKind::PwaInject,
            PluginSpec::Compression(_) => PluginKind::Compression,
        }
    }
}

/// `[server]` section of `weft.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default)]
    pub cors: bool,
}

/// `[preview]` section of `weft.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreviewOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub root: PathBuf,
    pub out_dir: PathBuf,
    #[serde(default)]
    pub server: ServerOptions,
    #[serde(default)]
    pub preview: PreviewOptions,
}

/// Everything the host tool needs for one serve/build run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePlan {
    pub context: BuildContext,
    pub root: PathBuf,
    pub out_dir: PathBuf,
    pub server: ServerOptions,
    pub preview: PreviewOptions,
    pub plugins: Vec<PluginSpec>,
    pub proxy: ProxyTable,
}

impl PipelinePlan {
    pub fn plugin_order(&self) -> Vec<PluginKind> {
        self.plugins.iter().map(PluginSpec::kind).collect()
    }

    pub fn plugin(&self, kind: PluginKind) -> Option<&PluginSpec> {
        self.plugins.iter().find(|plugin| plugin.kind() == kind)
    }

    pub fn service_worker(&self) -> Option<&ServiceWorkerPlan> {
        self.plugins.iter().find_map(|plugin| match plugin {
            PluginSpec::PwaInject(pwa) => Some(&pwa.service_worker),
            _ => None,
        })
    }

    pub fn manifest(&self) -> Option<&ManifestDescriptor> {
        self.plugins.iter().find_map(|plugin| match plugin {
            PluginSpec::PwaInject(pwa) => Some(&pwa.manifest),
            _ => None,
        })
    }

    /// Re-check the chain against the ordering constraints.
    pub fn verify_order(&self) -> Result<()> {
        let kinds = self.plugin_order();
        let position = |kind: PluginKind| kinds.iter().position(|k| *k == kind);

        for (idx, kind) in kinds.iter().enumerate() {
            if kinds[..idx].contains(kind) {
                return Err(ConfigError::DuplicatePlugin(kind.to_string()));
            }
        }

        check_requirements(&kinds)?;

        for (earlier, later) in RUNS_BEFORE {
            if let (Some(a), Some(b)) = (position(*earlier), position(*later)) {
                if a > b {
                    return Err(ConfigError::OrderingViolation {
                        plugin: later.to_string(),
                        message: format!("runs before '{earlier}', which must run first"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Compose the final plan. Fails on the first problem; no partial plan is returned.
pub fn assemble(
    context: BuildContext,
    settings: PipelineSettings,
    proxy: ProxyTable,
    plugins: Vec<PluginSpec>,
) -> Result<PipelinePlan> {
    let plugins = order_plugins(plugins)?;

    let plan = PipelinePlan {
        context,
        root: settings.root,
        out_dir: settings.out_dir,
        server: settings.server,
        preview: settings.preview,
        plugins,
        proxy,
    };

    tracing::debug!(
        mode = %plan.context.mode,
        plugins = ?plan.plugin_order(),
        proxy_rules = plan.proxy.len(),
        "assembled pipeline"
    );

    Ok(plan)
}

fn order_plugins(plugins: Vec<PluginSpec>) -> Result<Vec<PluginSpec>> {
    let mut graph: DiGraph<PluginKind, ()> = DiGraph::new();
    let mut nodes: HashMap<PluginKind, NodeIndex> = HashMap::new();
    let mut by_kind: HashMap<PluginKind, PluginSpec> = HashMap::new();

    for plugin in plugins {
        let kind = plugin.kind();
        if by_kind.contains_key(&kind) {
            return Err(ConfigError::DuplicatePlugin(kind.to_string()));
        }
        nodes.insert(kind, graph.add_node(kind));
        by_kind.insert(kind, plugin);
    }

    let present: Vec<PluginKind> = nodes.keys().copied().collect();
    check_requirements(&present)?;

    for (earlier, later) in RUNS_BEFORE {
        if let (Some(&a), Some(&b)) = (nodes.get(earlier), nodes.get(later)) {
            graph.add_edge(a, b, ());
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| ConfigError::OrderingViolation {
        plugin: graph[cycle.node_id()].to_string(),
        message: "ordering constraints form a cycle".to_string(),
    })?;

    Ok(order
        .into_iter()
        .filter_map(|idx| by_kind.remove(&graph[idx]))
        .collect())
}

fn check_requirements(present: &[PluginKind]) -> Result<()> {
    for (plugin, dependency) in REQUIRES {
        if present.contains(plugin) && !present.contains(dependency) {
            return Err(ConfigError::OrderingViolation {
                plugin: plugin.to_string(),
                message: format!("requires '{dependency}', which is not configured"),
            });
        }
    }
    Ok(())
}
