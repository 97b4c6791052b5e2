//! `genforge` binary

use clap::Parser;
use genforge_cli::{commands, logging, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    match commands::run(&cli) {
        Ok(output) => {
            println!("{}", output.stdout);
            if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
