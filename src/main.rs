mod cli;
mod error;
mod generate;
mod logging;
mod verify;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use flagpack_config::Loader;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Loader::default()
        .with_explicit(cli.config.clone())
        .with_overrides(cli.overrides())
        .load()
        .or_raise(|| ErrorKind::Config)?;
    match cli.command.unwrap_or(Command::Generate) {
        Command::Generate => generate::run(&config, cli.dry_run),
        Command::Verify => verify::run(&config).await,
    }
}
