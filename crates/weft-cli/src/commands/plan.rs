//! `serve` and `build` commands.
//!
//! Both resolve the plan for their mode, check it against the filesystem and
//! emit it as JSON. They differ only in the mode handed to the resolver.

use std::fs;

use weft_config::{BuildContext, FsValidator, Mode, PipelinePlan, PlanValidator};

use crate::cli::PlanArgs;
use crate::commands::utils;
use crate::error::{CliError, ConfigError, Result, ResultExt};
use crate::ui;

pub const MANIFEST_FILE_NAME: &str = "manifest.webmanifest";

/// Execute `serve` (`Mode::Serve`) or `build` (`Mode::Build`).
///
/// # Errors
///
/// Any configuration, filesystem or ceiling violation aborts before output is
/// written.
pub fn execute(args: PlanArgs, mode: Mode) -> Result<()> {
    if args.write_manifest && mode == Mode::Serve {
        return Err(CliError::InvalidArgument(
            "--write-manifest only applies to build".to_string(),
        ));
    }

    let loaded = utils::load_config(&args.config)?;
    let context = BuildContext::new(mode, args.ssr);
    tracing::debug!(mode = %mode, ssr = args.ssr, "resolving plan");

    let plan = loaded.config.resolve_plan(context)?;

    let mut validator = FsValidator::new(&loaded.project_dir);
    if let Some(assets) = &args.assets {
        validator = validator.with_assets(assets);
    }
    validator.validate(&plan)?;

    ui::print_plan_summary(&plan);

    let json = serde_json::to_string_pretty(&plan)?;
    let emit = args
        .emit
        .as_deref()
        .map(|path| utils::resolve_path(path, &loaded.project_dir));
    utils::write_output(emit.as_deref(), &json)?;
    if let Some(path) = &emit {
        ui::success(&format!("Plan written to {}", path.display()));
    }

    if args.write_manifest {
        write_manifest(&plan, &loaded.project_dir)?;
    }

    Ok(())
}

fn write_manifest(plan: &PipelinePlan, project_dir: &std::path::Path) -> Result<()> {
    let manifest = plan.manifest().ok_or_else(|| ConfigError::MissingField {
        field: "manifest".to_string(),
        hint: "Add a [manifest] section to write manifest.webmanifest".to_string(),
    })?;

    let out_dir = project_dir.join(&plan.root).join(&plan.out_dir);
    fs::create_dir_all(&out_dir).with_path(&out_dir)?;

    let path = out_dir.join(MANIFEST_FILE_NAME);
    fs::write(&path, manifest.to_json()?).with_path(&path)?;
    ui::success(&format!("Manifest written to {}", path.display()));
    Ok(())
}
