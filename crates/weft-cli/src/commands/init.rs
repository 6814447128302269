//! Init command implementation.
//!
//! Writes a starter `weft.toml` that resolves for both modes.

use std::fs;

use weft_config::discovery::CONFIG_FILE_NAME;

use crate::cli::InitArgs;
use crate::commands::{templates, utils};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the init command.
///
/// # Errors
///
/// Returns [`CliError::AlreadyExists`] when `weft.toml` is present and
/// `--force` was not given.
pub fn execute(args: InitArgs) -> Result<()> {
    let dir = utils::base_dir(args.cwd.as_deref())?;
    fs::create_dir_all(&dir).with_path(&dir)?;

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !args.force {
        return Err(CliError::AlreadyExists(path));
    }

    fs::write(&path, templates::STARTER_CONFIG).with_path(&path)?;
    ui::success(&format!("Created {}", path.display()));

    print_next_steps();
    Ok(())
}

fn print_next_steps() {
    ui::info("Next steps:");
    eprintln!("  1. Point [service_worker].source_template at your compiled worker");
    eprintln!("  2. Replace the [manifest] placeholders and icons");
    eprintln!("  3. Run `weft check`");
}
