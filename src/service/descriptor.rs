//! The installable service's identity.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ServiceConfig;
use crate::service::templates::ScriptTemplate;

/// Platform option flags carried into the rendered unit or script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOptions {
    /// Start the service when the init system loads it.
    pub run_at_load: bool,
    /// Capture stdout/stderr to log files.
    pub log_output: bool,
    /// Unit or script template for the host, if it has one.
    #[serde(skip)]
    pub script: Option<ScriptTemplate>,
}

/// Everything the OS service manager needs to register this program.
///
/// Built fresh for every service action; the OS manager persists its own
/// registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Absolute path of the executable the service runs.
    pub executable: PathBuf,
    pub working_directory: PathBuf,
    /// Arguments after the executable; always ends in `-s run [BIND_ADDRESS]`.
    pub arguments: Vec<String>,
    pub options: ServiceOptions,
}

impl ServiceDescriptor {
    pub fn new(
        service: &ServiceConfig,
        executable: PathBuf,
        working_directory: PathBuf,
        bind_address: Option<IpAddr>,
        config_file: Option<&Path>,
        script: Option<ScriptTemplate>,
    ) -> Self {
        let mut arguments = Vec::new();
        if let Some(file) = config_file {
            arguments.push("-c".to_string());
            arguments.push(file.display().to_string());
        }
        arguments.push("-s".to_string());
        arguments.push("run".to_string());
        if let Some(addr) = bind_address {
            arguments.push(addr.to_string());
        }

        Self {
            name: service.name.clone(),
            display_name: service.display_name.clone(),
            description: service.description.clone(),
            executable,
            working_directory,
            arguments,
            options: ServiceOptions {
                run_at_load: true,
                log_output: true,
                script,
            },
        }
    }
}
