//! weft CLI - resolve serve/build plans from `weft.toml`.
//!
//! The binary is a thin layer over [`weft_config`]: it loads the config file
//! (with environment overrides and an optional profile), resolves the plan for
//! the requested mode, checks it against the filesystem and emits JSON.
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - one module per subcommand
//! - [`error`] - `CliError` and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and plan summaries on stderr

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
