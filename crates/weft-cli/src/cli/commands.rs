use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::enums::ModeArg;

/// Available weft subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the dev-server plan
    ///
    /// Uses the fast artifact variant, verifies the compiled service worker
    /// exists and prints the plan as JSON.
    Serve(PlanArgs),

    /// Resolve the production build plan
    ///
    /// Uses the optimized artifact variant. With --assets, every emitted file is
    /// checked against the service worker cache ceiling.
    Build(PlanArgs),

    /// Validate configuration for both modes without emitting anything
    Check(CheckArgs),

    /// Print the composed web app manifest
    Manifest(ManifestArgs),

    /// Show which proxy rule handles a request path
    Proxy(ProxyArgs),

    /// Write a starter weft.toml
    Init(InitArgs),
}

/// Options shared by every command that loads `weft.toml`
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to the config file (defaults to <cwd>/weft.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Named profile to merge over the base config
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Project directory; relative paths in the config resolve against it
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for `serve` and `build`
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Resolve for a server-side rendering pass
    #[arg(long)]
    pub ssr: bool,

    /// Write the plan JSON to FILE instead of stdout
    #[arg(long, value_name = "FILE")]
    pub emit: Option<PathBuf>,

    /// Directory of emitted assets to check against the cache ceiling
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Also write <out_dir>/manifest.webmanifest
    #[arg(long)]
    pub write_manifest: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Skip filesystem checks (bundler root, compiled service worker)
    #[arg(long)]
    pub schema_only: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ManifestArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write the manifest to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProxyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Request path to look up, e.g. /ws or /ops/health
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Mode to resolve the proxy table for
    #[arg(short, long, value_enum, default_value = "serve")]
    pub mode: ModeArg,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Directory to write weft.toml into
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Overwrite an existing weft.toml
    #[arg(short, long)]
    pub force: bool,
}
