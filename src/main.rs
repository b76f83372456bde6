use alexandria::cli::{self, Cli};
use alexandria::logging::{LogSettings, init_logging};
use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = LogSettings {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        file: cli.log_file.as_deref(),
    };
    if let Err(err) = init_logging(&settings).context("failed to initialize logging") {
        eprintln!("Warning: {err:#}");
    }

    match cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.code();
            error!(code = code.as_str(), error = %err, "Command failed");
            eprintln!("Error: {err}");
            ExitCode::from(u8::try_from(code.exit_code()).unwrap_or(1))
        }
    }
}
