//! Shared helpers for command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use weft_config::WeftConfig;
use weft_config::discovery::CONFIG_FILE_NAME;

use crate::cli::ConfigArgs;
use crate::error::{Result, ResultExt};

/// A loaded config together with the directory its relative paths resolve against.
#[derive(Debug)]
pub struct LoadedConfig {
    pub project_dir: PathBuf,
    pub config: WeftConfig,
}

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Get the current working directory.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to read current directory")
}

/// Working directory for a command: `--cwd` if given, else the process cwd.
pub fn base_dir(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = get_cwd()?;
    Ok(match cwd {
        Some(dir) => resolve_path(dir, &current),
        None => current,
    })
}

/// Locate `weft.toml`, apply env overrides and the requested profile.
///
/// The project directory is the one holding the config file, so `--config
/// other/weft.toml` resolves `root` against `other/`.
pub fn load_config(args: &ConfigArgs) -> Result<LoadedConfig> {
    let base = base_dir(args.cwd.as_deref())?;
    let path = match &args.config {
        Some(path) => resolve_path(path, &base),
        None => base.join(CONFIG_FILE_NAME),
    };

    let config = weft_config::load_from(&path)?;
    let config = config.materialize_profile(args.profile.as_deref())?;
    if let Some(profile) = &args.profile {
        tracing::info!(profile = %profile, "using profile");
    }

    let project_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(base);

    Ok(LoadedConfig {
        project_dir,
        config,
    })
}

/// Write `contents` to `path`, or print them to stdout when no path is given.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_path(parent)?;
            }
            fs::write(path, contents).with_path(path)?;
            tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
        }
        None => println!("{contents}"),
    }
    Ok(())
}
