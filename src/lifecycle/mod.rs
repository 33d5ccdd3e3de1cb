//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve paths → Identity bootstrap → (listener may bind)
//!
//! Run (supervisor.rs):
//!     Spawn listener → readiness oneshot → wait for signal → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Service actions (this module):
//!     Detect platform → Build descriptor → Native manager → Controller
//! ```
//!
//! # Design Decisions
//! - Ordered startup: identity first, listener last
//! - Service actions are synchronous; only `run` needs the runtime
//! - The host platform is probed once per invocation

pub mod signals;
pub mod startup;
pub mod supervisor;

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AppConfig, ConfigError};
use crate::error::AppError;
use crate::service::{
    manager_for, CommandRunner, HostPlatform, ServiceAction, ServiceController,
    ServiceDescriptor, SystemRunner,
};

pub use supervisor::{run_foreground, run_managed, RunConfiguration, ServeError};

/// Perform one `-s` action and return the process exit code.
///
/// `config_file` is passed on to the installed service so it runs with the
/// same configuration.
pub async fn perform_action(
    action: ServiceAction,
    config: &AppConfig,
    bind_address: Option<IpAddr>,
    config_file: Option<&Path>,
) -> Result<u8, AppError> {
    if action == ServiceAction::Run {
        let bind_address = bind_address.ok_or(ConfigError::MissingBindAddress)?;
        run_managed(config, bind_address).await?;
        return Ok(0);
    }

    let platform = HostPlatform::detect();
    tracing::debug!(platform = platform.name(), "Detected host platform");

    let executable = std::env::current_exe().map_err(ConfigError::Executable)?;
    let working_directory = std::env::current_dir().map_err(ConfigError::WorkingDirectory)?;
    // Joining an absolute path replaces the base.
    let config_file = config_file.map(|file| working_directory.join(file));

    let descriptor = ServiceDescriptor::new(
        &config.service,
        executable,
        working_directory,
        bind_address,
        config_file.as_deref(),
        platform.script_template(),
    );

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let manager = manager_for(platform, descriptor, Arc::clone(&runner), Path::new("/"))?;
    let outcome = ServiceController::new(manager, platform, runner).perform(&action)?;
    Ok(outcome.exit_code())
}
