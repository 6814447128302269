use clap::ValueEnum;
use weft_config::Mode;

/// Invocation mode selectable on the command line
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    /// Dev server run (fast artifacts)
    #[value(name = "serve")]
    Serve,

    /// Production build (optimized artifacts)
    #[value(name = "build")]
    Build,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Serve => Mode::Serve,
            ModeArg::Build => Mode::Build,
        }
    }
}
