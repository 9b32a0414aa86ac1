//! Binary entry point: parse arguments, set up logging, dispatch.

use anyhow::Result;
use clap::Parser;

use shellgen::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose);

    match args.command {
        cli::Command::Generate(opts) => commands::generate::run(&opts, args.verbose),
        cli::Command::Vars(opts) => commands::vars::run(&opts),
        cli::Command::Version => {
            let version = option_env!("SHELLGEN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("shellgen {version}");
            Ok(())
        }
    }
}
