//! Build configuration resolver for bundled web apps whose client code comes
//! from a secondary-language compiler.
//!
//! Given a [`BuildContext`] (serve or build), [`WeftConfig::resolve_plan`] picks the
//! compiled-artifact variant, builds the dev proxy table, composes the web app
//! manifest, plans the service worker and orders the plugin chain into a
//! [`PipelinePlan`]. Every step validates its input and the first failure aborts
//! the whole composition.

pub mod config;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod mode;
pub mod pipeline;
pub mod proxy;
pub mod service_worker;
pub mod validation;

// Re-export main types
pub use config::*;
pub use error::*;
pub use manifest::{
    DisplayMode, IconRef, ManifestDescriptor, ManifestSource, ProtocolHandler, ShareTargetFile,
    ShareTargetParams, ShareTargetSpec, ShortcutRef, compose,
};
pub use mode::{ArtifactVariant, BuildContext, Mode, resolve};
pub use pipeline::*;
pub use proxy::{PathPattern, ProxyRoute, ProxyRule, ProxyRuleConfig, ProxyTable, RouteKind};
pub use service_worker::{
    AssetSize, InjectRegister, ServiceWorkerOptions, ServiceWorkerPlan, SwStrategy, scan_assets,
};

// Re-export discovery and validation
pub use discovery::{ConfigDiscovery, load_from};
pub use validation::{FsValidator, PlanValidator, SchemaValidator};
