use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use mirdir::cli::Cli;
use mirdir::commands;
use mirdir::error::MirdirError;
use mirdir::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose, "mirdir");
    let log = Logger::new("mirdir");

    match run(&args, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log.debug(&format!("{err:#}"));
            print_failure(&err, args.verbose);
            ExitCode::from(err.downcast_ref::<MirdirError>().map_or(1, MirdirError::exit_code))
        }
    }
}

fn run(args: &Cli, log: &Logger) -> Result<()> {
    commands::mirror::run(args, log)?;
    Ok(())
}

#[allow(clippy::print_stderr)]
fn print_failure(err: &anyhow::Error, verbose: bool) {
    match err.downcast_ref::<MirdirError>() {
        Some(mirdir) => eprintln!("Error: {}", mirdir.summary()),
        None => eprintln!("Error: {err}"),
    }
    if verbose {
        for cause in err.chain() {
            eprintln!("  {cause}");
        }
    }
}
