//! Manifest command implementation.

use weft_config::compose;

use crate::cli::ManifestArgs;
use crate::commands::utils;
use crate::error::{ConfigError, Result};
use crate::ui;

/// Compose the `[manifest]` section and print or write it as JSON.
pub fn execute(args: ManifestArgs) -> Result<()> {
    let loaded = utils::load_config(&args.config)?;

    let source = loaded
        .config
        .manifest
        .clone()
        .ok_or_else(|| ConfigError::MissingField {
            field: "manifest".to_string(),
            hint: "Add a [manifest] section to weft.toml".to_string(),
        })?;
    let manifest = compose(source)?;
    let json = manifest.to_json()?;

    let out = args
        .out
        .as_deref()
        .map(|path| utils::resolve_path(path, &loaded.project_dir));
    utils::write_output(out.as_deref(), &json)?;
    if let Some(path) = out {
        ui::success(&format!("Manifest written to {}", path.display()));
    }
    Ok(())
}
