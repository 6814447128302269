//! Proxy command implementation.

use weft_config::BuildContext;

use crate::cli::ProxyArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

/// Print where a request path would be routed by the dev server.
pub fn execute(args: ProxyArgs) -> Result<()> {
    if !args.path.starts_with('/') {
        return Err(CliError::InvalidArgument(format!(
            "request path '{}' must start with '/'",
            args.path
        )));
    }

    let loaded = utils::load_config(&args.config)?;
    let context = BuildContext::new(args.mode.into(), false);
    tracing::debug!(mode = %context.mode, "resolving plan for proxy lookup");

    let plan = loaded.config.resolve_plan(context)?;
    if plan.proxy.is_empty() {
        ui::warning("No proxy rules configured");
    }

    let route = plan.proxy.resolve(&args.path);
    println!("{}", ui::render_route(&args.path, route.as_ref()));
    Ok(())
}
