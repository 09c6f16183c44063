//! # Caret CLI
//!
//! Entry point for the `caret` binary: logging setup, then [`caret_cli::run`].

use caret_analyzer::logging::{self, codes, FacadeLogger, LogLevel, LoggingService};
use caret_analyzer::log_error;
use caret_cli::{load_config, run, Cli};
use clap::Parser;
use std::sync::Arc;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .format_timestamp(None)
        .init();

    // analyzer events go through the `log` facade so `--log-level` filters both
    let service = LoggingService::new(Arc::new(FacadeLogger), event_level(cli.log_level));
    if let Err(e) = logging::init_global_logging_with_service(Arc::new(service)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = load_config(&cli).and_then(|config| run(&cli, &config));
    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            log_error!(codes::system::INTERNAL_ERROR, "Command failed",
                "error" => &e
            );
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn event_level(filter: log::LevelFilter) -> LogLevel {
    match filter {
        log::LevelFilter::Off | log::LevelFilter::Error => LogLevel::Error,
        log::LevelFilter::Warn => LogLevel::Warning,
        log::LevelFilter::Info => LogLevel::Info,
        log::LevelFilter::Debug | log::LevelFilter::Trace => LogLevel::Debug,
    }
}
