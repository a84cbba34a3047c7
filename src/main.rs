use anyhow::Result;
use fragmap::cli::{init_logging, parse_args, run, CommandStatus};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = parse_args();
    init_logging(cli.verbosity);

    match run(cli)? {
        CommandStatus::Success => Ok(ExitCode::SUCCESS),
        CommandStatus::GateFailed => Ok(ExitCode::FAILURE),
    }
}
