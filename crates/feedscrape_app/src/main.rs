mod cli;
mod commands;
mod interactive;
mod logging;
mod runner;
mod settings;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {err:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => {
            let report = runner::run_batch(&args)?;
            for line in &report.statuses {
                println!("{line}");
            }
            Ok(())
        }
        Command::Interactive(args) => interactive::run_interactive(&args),
    }
}
