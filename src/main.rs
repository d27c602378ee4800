use clap::{CommandFactory, Parser};
use fxhandlers::cli::{self, Cli};
use fxhandlers::config::Config;
use fxhandlers::observability;
use std::process::ExitCode;

/// Exit status for usage output, `-1` as a byte
const USAGE_EXIT: u8 = 255;

fn main() -> ExitCode {
    let no_arguments = std::env::args_os().len() <= 1;
    let cli = Cli::parse();

    if no_arguments || cli.help {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("error: {}", err);
        }
        return ExitCode::from(USAGE_EXIT);
    }

    // Config loading logs before the configured filter is known
    let loaded =
        tracing::subscriber::with_default(observability::bootstrap(cli.verbose), Config::load);
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    observability::init(&config.logging, cli.verbose);

    match cli::execute(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(kind = ?err.kind(), "Command failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
