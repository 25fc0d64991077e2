use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use kanata_setup::{cli, commands, logging, platform};

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        commands::version::run();
        return ExitCode::SUCCESS;
    }

    let command = args.command.name();
    let log_file = args
        .command
        .writes_log_file(platform::effective_uid())
        .then(|| logging::log_file_path(command));
    logging::init_subscriber(args.verbose, command, log_file.as_deref());
    let log = Arc::new(logging::Logger::new(log_file));

    let result = match args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        cli::Command::Uninstall(opts) => commands::uninstall::run(&args.global, &opts, &log),
        cli::Command::Status => commands::status::run(&args.global, &log),
        cli::Command::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
