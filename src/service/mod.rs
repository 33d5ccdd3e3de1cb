//! Service lifecycle orchestration.
//!
//! # Data Flow
//! ```text
//! CLI action word
//!     → ServiceAction
//!     → platform.rs (host init system, detected once)
//!     → descriptor.rs (name, executable, arguments, script template)
//!     → manager.rs (systemd.rs | init_script.rs)
//!     → controller.rs (init-script fallback, enable/disable, status exit code)
//! ```
//!
//! # Design Decisions
//! - Native managers shell out through [`CommandRunner`] so they can be tested
//! - The platform is a value; callers never branch on the OS themselves
//! - Failures propagate as [`ServiceError`]; nothing is retried beyond the
//!   single script fallback

pub mod command;
pub mod controller;
pub mod descriptor;
pub mod init_script;
pub mod manager;
pub mod platform;
pub mod systemd;
pub mod templates;

#[doc(hidden)]
pub mod testing;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use controller::{ActionOutcome, ServiceController};
pub use descriptor::{ServiceDescriptor, ServiceOptions};
pub use manager::{control, manager_for, ServiceManager};
pub use platform::{HostPlatform, HostProbe, InitFlavor};
pub use templates::ScriptTemplate;

/// Status reported by the host init system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    Unknown,
}

impl ServiceStatus {
    /// Process exit code for `-s status`.
    pub fn exit_code(&self) -> u8 {
        match self {
            ServiceStatus::Running => 0,
            ServiceStatus::Stopped => 1,
            ServiceStatus::Unknown => 2,
        }
    }
}

/// The action word given with `-s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAction {
    Install,
    Uninstall,
    Start,
    Stop,
    Restart,
    Status,
    Run,
    /// Anything else; rejected by the native dispatcher.
    Other(String),
}

impl ServiceAction {
    pub fn verb(&self) -> &str {
        match self {
            ServiceAction::Install => "install",
            ServiceAction::Uninstall => "uninstall",
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Status => "status",
            ServiceAction::Run => "run",
            ServiceAction::Other(verb) => verb,
        }
    }
}

impl FromStr for ServiceAction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "install" => ServiceAction::Install,
            "uninstall" => ServiceAction::Uninstall,
            "start" => ServiceAction::Start,
            "stop" => ServiceAction::Stop,
            "restart" => ServiceAction::Restart,
            "status" => ServiceAction::Status,
            "run" => ServiceAction::Run,
            other => ServiceAction::Other(other.to_string()),
        })
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Errors raised while registering or controlling the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service management is not supported on {os}")]
    Unsupported { os: String },

    #[error("Service {name} is not installed")]
    NotInstalled { name: String },

    #[error("Service is already installed at {}", .path.display())]
    AlreadyInstalled { path: PathBuf },

    #[error("Unknown action '{action}'; valid actions: {valid}")]
    UnknownAction { action: String, valid: String },

    #[error("No init script to fall back to for {action}")]
    NoInitScript { action: String },

    #[error("`{command}` failed with {}: {stderr}", exit_description(*.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not render {name}: {message}")]
    Template { name: &'static str, message: String },

    #[error("Error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}
