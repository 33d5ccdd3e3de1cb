//! Test doubles for the command runner and native managers.
//!
//! `ScriptedRunner` is public so integration tests can drive service actions
//! without touching the host.

use std::collections::HashMap;
#[cfg(test)]
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Arc;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::service::command::{CommandOutput, CommandRunner};
use crate::service::ServiceError;
#[cfg(test)]
use crate::service::{ServiceManager, ServiceStatus};

/// Records every command and answers from a table; unknown commands exit 0.
///
/// Commands are keyed by `"program arg arg"`.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    responses: Mutex<HashMap<String, CommandOutput>>,
    unspawnable: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn respond(&self, command: &str, output: CommandOutput) {
        lock(&self.responses).insert(command.to_string(), output);
    }

    /// Make `program` fail to start.
    pub fn fail_spawn(&self, program: &str) {
        lock(&self.unspawnable).push(program.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ServiceError> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        lock(&self.calls).push(command.clone());

        if lock(&self.unspawnable).iter().any(|p| p == program) {
            return Err(ServiceError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        Ok(lock(&self.responses)
            .get(&command)
            .cloned()
            .unwrap_or_else(|| CommandOutput::exited(0)))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A native manager whose calls succeed or fail on demand.
#[cfg(test)]
pub struct FakeManager {
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    /// Verbs whose native call fails.
    pub failing: Vec<&'static str>,
    pub status: ServiceStatus,
    /// When false, `status` reports the service as not installed.
    pub installed: bool,
    pub script: Option<PathBuf>,
}

#[cfg(test)]
impl FakeManager {
    pub fn new(script: Option<&str>) -> Self {
        Self {
            calls: Arc::default(),
            failing: Vec::new(),
            status: ServiceStatus::Running,
            installed: true,
            script: script.map(PathBuf::from),
        }
    }

    fn call(&self, verb: &'static str) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(verb);
        if self.failing.contains(&verb) {
            Err(ServiceError::CommandFailed {
                command: format!("native {}", verb),
                exit_code: Some(1),
                stderr: String::new(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl ServiceManager for FakeManager {
    fn platform_name(&self) -> &'static str {
        "fake"
    }

    fn install(&self) -> Result<(), ServiceError> {
        self.call("install")
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        self.call("uninstall")
    }

    fn start(&self) -> Result<(), ServiceError> {
        self.call("start")
    }

    fn stop(&self) -> Result<(), ServiceError> {
        self.call("stop")
    }

    fn restart(&self) -> Result<(), ServiceError> {
        self.call("restart")
    }

    fn status(&self) -> Result<ServiceStatus, ServiceError> {
        if !self.installed {
            return Err(ServiceError::NotInstalled {
                name: "lgtv-sdp".to_string(),
            });
        }
        self.call("status").map(|_| self.status)
    }

    fn init_script(&self) -> Option<&Path> {
        self.script.as_deref()
    }
}
