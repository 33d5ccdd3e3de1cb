//! initservices responder
//!
//! Answers a TV's boot-time initservices requests over HTTPS with a fixed
//! JSON body and operator-supplied headers, and installs itself as an OS
//! service.
//!
//! # Architecture Overview
//!
//! ```text
//!     CLI ──▶ config ──▶ logging
//!              │
//!              ├── BIND_ADDRESS ───────▶ lifecycle::run_foreground ─┐
//!              │                                                     ├─▶ identity ─▶ net ─▶ http
//!              ├── -s run ─────────────▶ lifecycle::run_managed ────┘
//!              │
//!              └── -s ACTION ──────────▶ service (platform → manager → controller)
//! ```
//!
//! Every failure travels back here as an `AppError` and becomes exit code 1;
//! `-s status` exits with the service status code.

use std::process::ExitCode;

use initservices_responder::cli::{self, CliError, Invocation};
use initservices_responder::config::{load_or_default, AppConfig};
use initservices_responder::error::AppError;
use initservices_responder::lifecycle::{perform_action, run_foreground};
use initservices_responder::observability::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<_> = std::env::args_os().collect();
    let cmd = args
        .first()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "initservices-responder".to_string());

    let invocation = match cli::parse_args(args) {
        Ok(invocation) => invocation,
        Err(e) => return report_cli_error(&cmd, e),
    };

    let config = match load_or_default(invocation.config_file()) {
        Ok(config) => config,
        Err(e) => return report_error(&AppError::from(e)),
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Could not initialize logging: {}", e);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "initservices-responder starting");

    match dispatch(invocation, &config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => report_error(&e),
    }
}

async fn dispatch(invocation: Invocation, config: &AppConfig) -> Result<u8, AppError> {
    match invocation {
        Invocation::Foreground { bind_address, .. } => {
            run_foreground(config, bind_address).await?;
            Ok(0)
        }
        Invocation::Service {
            action,
            bind_address,
            config: config_file,
        } => perform_action(action, config, bind_address, config_file.as_deref()).await,
    }
}

fn report_cli_error(cmd: &str, e: CliError) -> ExitCode {
    let code = e.exit_code();
    match &e {
        CliError::Help => eprint!("{}", cli::usage(cmd)),
        CliError::Usage(message) => eprint!("{}:\n\n{}", message, cli::usage(cmd)),
        CliError::Clap(e) => {
            let _ = e.print();
        }
        CliError::Address(_) => eprintln!("Error: {}", e),
    }
    ExitCode::from(code)
}

fn report_error(e: &AppError) -> ExitCode {
    eprintln!("Error: {}", e);
    ExitCode::FAILURE
}
