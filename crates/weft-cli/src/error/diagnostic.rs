//! Miette diagnostic conversion for CLI errors.

use miette::Report;

use crate::error::{CliError, ConfigError};

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a library error, splitting any trailing hint into miette's help slot.
pub fn config_error_to_miette(err: ConfigError) -> Report {
    let code = error_code(&err);
    let rendered = err.to_string();
    match rendered.split_once("\n\nHint: ") {
        Some((message, hint)) => {
            miette::miette!(code = code, help = hint.to_string(), "{}", message)
        }
        None => miette::miette!(code = code, "{}", rendered),
    }
}

fn error_code(err: &ConfigError) -> &'static str {
    match err {
        ConfigError::NotFound { .. } => "weft::config::not_found",
        ConfigError::InvalidValue { .. } => "weft::config::invalid_value",
        ConfigError::UnknownProfile { .. } | ConfigError::InvalidProfileOverride { .. } => {
            "weft::config::profile"
        }
        ConfigError::MissingField { .. } | ConfigError::SchemaValidation { .. } => {
            "weft::config::schema"
        }
        ConfigError::InvalidProxyPattern { .. }
        | ConfigError::InvalidProxyTarget { .. }
        | ConfigError::DuplicateProxyPattern(_) => "weft::proxy",
        ConfigError::RootNotFound { .. }
        | ConfigError::AssetsNotFound { .. }
        | ConfigError::MissingArtifact { .. } => "weft::fs::missing",
        ConfigError::CeilingTooLow { .. } => "weft::service_worker::ceiling",
        ConfigError::DuplicatePlugin(_) | ConfigError::OrderingViolation { .. } => {
            "weft::pipeline"
        }
        ConfigError::Io(_) => "weft::io",
    }
}
