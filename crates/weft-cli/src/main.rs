//! weft command-line entry point.

use clap::Parser;
use miette::Result;
use weft_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Serve(plan_args) => commands::serve_execute(plan_args),
        cli::Command::Build(plan_args) => commands::build_execute(plan_args),
        cli::Command::Check(check_args) => commands::check_execute(check_args),
        cli::Command::Manifest(manifest_args) => commands::manifest_execute(manifest_args),
        cli::Command::Proxy(proxy_args) => commands::proxy_execute(proxy_args),
        cli::Command::Init(init_args) => commands::init_execute(init_args),
    };

    result.map_err(error::cli_error_to_miette)
}
