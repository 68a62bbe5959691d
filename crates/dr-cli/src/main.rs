use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use dr_cli::report::render_error;
use dr_cli::{logging, render_stop_report, AppConfig, Cli, Command};
use tracing::debug;

/// Exit status for malformed input and every other runtime failure.
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error(&err, cli.command.path()));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let path = cli.command.path();
    debug!(path = %path.display(), "loading transcript");

    let transcript = meter::load_transcript(path)?;
    let result = meter::score_transcript_with(&transcript, &config.scoring)?;

    match &cli.command {
        Command::Score { .. } => println!("{}", result.to_pretty_json()?),
        Command::Stop { .. } => print!("{}", render_stop_report(&result)),
    }
    Ok(())
}
