//! Invocation mode and the compiled-artifact variant it selects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the host tool was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Development server with fast recompilation.
    Serve,
    /// Production build.
    Build,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Serve => f.write_str("serve"),
            Mode::Build => f.write_str("build"),
        }
    }
}

/// Which build profile of the compiled module to consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactVariant {
    /// Unoptimized output, quick to relink.
    Fast,
    /// Size/speed optimized output.
    Optimized,
}

impl ArtifactVariant {
    /// Suffix the compiler appends to the artifact directory for this variant.
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactVariant::Fast => "fastopt",
            ArtifactVariant::Optimized => "opt",
        }
    }
}

impl fmt::Display for ArtifactVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactVariant::Fast => f.write_str("fast"),
            ArtifactVariant::Optimized => f.write_str("optimized"),
        }
    }
}

/// Map an invocation mode to the artifact variant it consumes.
pub fn resolve(mode: Mode) -> ArtifactVariant {
    match mode {
        Mode::Serve => ArtifactVariant::Fast,
        Mode::Build => ArtifactVariant::Optimized,
    }
}

/// Per-invocation facts every component reads. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    pub mode: Mode,
    #[serde(default)]
    pub ssr: bool,
}

impl BuildContext {
    pub fn new(mode: Mode, ssr: bool) -> Self {
        Self { mode, ssr }
    }

    pub fn serve() -> Self {
        Self::new(Mode::Serve, false)
    }

    pub fn build() -> Self {
        Self::new(Mode::Build, false)
    }

    pub fn artifact_variant(self) -> ArtifactVariant {
        resolve(self.mode)
    }
}
