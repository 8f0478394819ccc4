use imgsync_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log to the XDG state file; stderr if that is not writable.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", e);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("imgsync error: {:#}", err);
        std::process::exit(1);
    }
}
