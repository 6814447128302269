//! Command implementations for the weft CLI.
//!
//! Each command lives in its own module and exposes an `execute` function
//! taking the parsed arguments.

pub mod check;
pub mod init;
pub mod manifest;
pub mod plan;
pub mod proxy;
mod templates;
pub(crate) mod utils;

use weft_config::Mode;

use crate::cli::PlanArgs;
use crate::error::Result;

pub use check::execute as check_execute;
pub use init::execute as init_execute;
pub use manifest::execute as manifest_execute;
pub use proxy::execute as proxy_execute;

pub fn serve_execute(args: PlanArgs) -> Result<()> {
    plan::execute(args, Mode::Serve)
}

pub fn build_execute(args: PlanArgs) -> Result<()> {
    plan::execute(args, Mode::Build)
}
