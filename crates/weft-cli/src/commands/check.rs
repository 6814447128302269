//! Check command implementation.
//!
//! Resolves the plan for both modes without writing anything.

use weft_config::{BuildContext, FsValidator, Mode, PlanValidator, SchemaValidator};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// Serve is checked first, then build. The first failure is reported on its
/// mode line and returned as is.
pub fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let loaded = utils::load_config(&args.config)?;
    let fs_validator = FsValidator::new(&loaded.project_dir);

    for mode in [Mode::Serve, Mode::Build] {
        let plan = loaded
            .config
            .resolve_plan(BuildContext::new(mode, false))
            .and_then(|plan| {
                if args.schema_only {
                    SchemaValidator.validate(&plan)?;
                } else {
                    fs_validator.validate(&plan)?;
                }
                Ok(plan)
            })
            .inspect_err(|_| ui::error(&format!("{mode}: check failed")))?;

        let chain: Vec<&str> = plan.plugins.iter().map(|p| p.kind().name()).collect();
        ui::success(&format!(
            "{mode}: {} variant, {} proxy rule(s), {}",
            plan.context.artifact_variant(),
            plan.proxy.len(),
            chain.join(" -> ")
        ));
    }

    if !loaded.config.profiles.is_empty() {
        ui::info(&format!(
            "Profiles available: {}",
            loaded.config.profile_names().join(", ")
        ));
    }

    ui::success("All checks passed!");
    Ok(())
}
