//! Subprocess execution for service-manager tools and init scripts.
//!
//! Commands are executed directly (no shell) with captured output. There is
//! no timeout: control calls are synchronous and unbounded.

use std::process::{Command, Output};

use crate::service::ServiceError;

/// Result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Output of a process that exited with `code` and printed nothing.
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    fn from_output(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs external programs on behalf of the service managers.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit.
    ///
    /// Fails only when the process could not be started; a non-zero exit is
    /// reported through [`CommandOutput::exit_code`].
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ServiceError>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ServiceError> {
        tracing::debug!(program = %program, args = ?args, "Executing subprocess");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ServiceError::Spawn {
                program: program.to_string(),
                source,
            })?;
        let result = CommandOutput::from_output(output);

        tracing::debug!(
            program = %program,
            exit_code = ?result.exit_code,
            "Subprocess completed"
        );
        Ok(result)
    }
}

/// Run a command and turn a non-zero exit into [`ServiceError::CommandFailed`].
pub fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput, ServiceError> {
    let output = runner.run(program, args)?;
    if output.success() {
        Ok(output)
    } else {
        Err(ServiceError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}
