//! Command-line interface definition for weft.
//!
//! - `weft serve` / `weft build` - resolve and emit the plan for that mode
//! - `weft check` - resolve both modes and report the first error
//! - `weft manifest` - print the composed web app manifest
//! - `weft proxy <PATH>` - show which proxy rule handles a path
//! - `weft init` - write a starter `weft.toml`

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{
    CheckArgs, Command, ConfigArgs, InitArgs, ManifestArgs, PlanArgs, ProxyArgs,
};
pub use enums::ModeArg;

/// weft - build configuration resolver
#[derive(Parser, Debug)]
#[command(
    name = "weft",
    version,
    about = "Resolve serve/build plans for bundled web apps",
    long_about = "weft reads weft.toml and resolves, for a serve or build run, the compiled\n\
                  artifact variant, the dev proxy table, the web app manifest, the service\n\
                  worker plan and the ordered plugin chain."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
