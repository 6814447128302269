//! Error types for configuration loading, validation and plan assembly.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Config parsing/loading errors
    #[error("no weft.toml found in {}", .root.display())]
    NotFound { root: PathBuf },

    #[error("invalid config value for '{field}'{}", hint_suffix(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("unknown profile '{name}'{}", available_suffix(.available))]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("invalid profile override: {message}")]
    InvalidProfileOverride { message: String },

    #[error("missing required field '{field}'\n\nHint: {hint}")]
    MissingField { field: String, hint: String },

    // Schema validation errors (no filesystem checks)
    #[error("{field}: {message}{}", hint_suffix(.hint))]
    SchemaValidation {
        field: String,
        message: String,
        hint: Option<String>,
    },

    #[error("proxy rule '{pattern}': invalid pattern: {message}")]
    InvalidProxyPattern { pattern: String, message: String },

    #[error("proxy rule '{pattern}': invalid target '{target}': {message}")]
    InvalidProxyTarget {
        pattern: String,
        target: String,
        message: String,
    },

    #[error("proxy pattern '{0}' is declared more than once")]
    DuplicateProxyPattern(String),

    // Filesystem validation errors (for CLI use)
    #[error("bundler root not found: {}", .path.display())]
    RootNotFound { path: PathBuf },

    #[error("assets directory not found: {}", .path.display())]
    AssetsNotFound { path: PathBuf },

    #[error(
        "service worker source not found: {}\n\nHint: compile the worker project before running this stage",
        .path.display()
    )]
    MissingArtifact { path: PathBuf },

    #[error(
        "asset {} is {size} bytes, above the service worker cache ceiling of {ceiling} bytes\n\nHint: raise service_worker.max_cacheable_bytes or the asset will not be precached",
        .asset.display()
    )]
    CeilingTooLow {
        asset: PathBuf,
        size: u64,
        ceiling: u64,
    },

    // Plugin chain errors
    #[error("plugin '{0}' is configured more than once")]
    DuplicatePlugin(String),

    #[error("plugin ordering violation at '{plugin}': {message}")]
    OrderingViolation { plugin: String, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaValidation {
            field: field.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub(crate) fn schema_with_hint(
        field: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::SchemaValidation {
            field: field.into(),
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// The config field the error points at, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. }
            | Self::MissingField { field, .. }
            | Self::SchemaValidation { field, .. } => Some(field),
            Self::InvalidProxyPattern { pattern, .. }
            | Self::InvalidProxyTarget { pattern, .. } => Some(pattern),
            _ => None,
        }
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!("\n\nHint: {hint}"),
        None => String::new(),
    }
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " (no profiles are defined)".to_string()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}
