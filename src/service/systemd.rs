//! systemd unit management through `systemctl`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::service::command::{run_checked, CommandRunner};
use crate::service::templates::ScriptTemplate;
use crate::service::{ServiceDescriptor, ServiceError, ServiceManager, ServiceStatus};

const SYSTEMCTL: &str = "systemctl";

/// Manages `<unit_dir>/<name>.service`.
pub struct SystemdManager {
    descriptor: ServiceDescriptor,
    runner: Arc<dyn CommandRunner>,
    unit_dir: PathBuf,
}

impl SystemdManager {
    pub fn new(
        descriptor: ServiceDescriptor,
        runner: Arc<dyn CommandRunner>,
        unit_dir: PathBuf,
    ) -> Self {
        Self {
            descriptor,
            runner,
            unit_dir,
        }
    }

    fn unit_name(&self) -> String {
        format!("{}.service", self.descriptor.name)
    }

    fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_name())
    }

    fn systemctl(&self, args: &[&str]) -> Result<(), ServiceError> {
        run_checked(self.runner.as_ref(), SYSTEMCTL, args).map(|_| ())
    }

    fn render_unit(&self) -> Result<String, ServiceError> {
        self.descriptor
            .options
            .script
            .unwrap_or(ScriptTemplate::SystemdUnit)
            .render(&self.descriptor)
    }
}

impl ServiceManager for SystemdManager {
    fn platform_name(&self) -> &'static str {
        "linux-systemd"
    }

    fn install(&self) -> Result<(), ServiceError> {
        let path = self.unit_path();
        if path.exists() {
            return Err(ServiceError::AlreadyInstalled { path });
        }

        let unit = self.render_unit()?;
        write_file(&path, &unit, 0o644)?;
        tracing::info!(unit = %path.display(), "Wrote systemd unit");

        self.systemctl(&["daemon-reload"])?;
        if self.descriptor.options.run_at_load {
            self.systemctl(&["enable", &self.unit_name()])?;
        }
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        let path = self.unit_path();
        if !path.exists() {
            return Err(ServiceError::NotInstalled {
                name: self.descriptor.name.clone(),
            });
        }

        self.systemctl(&["disable", &self.unit_name()])?;
        fs::remove_file(&path).map_err(|source| ServiceError::Io {
            path: path.clone(),
            source,
        })?;
        self.systemctl(&["daemon-reload"])
    }

    fn start(&self) -> Result<(), ServiceError> {
        self.systemctl(&["start", &self.unit_name()])
    }

    fn stop(&self) -> Result<(), ServiceError> {
        self.systemctl(&["stop", &self.unit_name()])
    }

    fn restart(&self) -> Result<(), ServiceError> {
        self.systemctl(&["restart", &self.unit_name()])
    }

    fn status(&self) -> Result<ServiceStatus, ServiceError> {
        if !self.unit_path().exists() {
            return Err(ServiceError::NotInstalled {
                name: self.descriptor.name.clone(),
            });
        }

        // is-active exits non-zero for every state but "active"; the state
        // word on stdout is what matters.
        let output = self
            .runner
            .run(SYSTEMCTL, &["is-active", &self.unit_name()])?;
        Ok(match output.stdout.trim() {
            "active" | "activating" | "reloading" => ServiceStatus::Running,
            "inactive" | "deactivating" | "failed" => ServiceStatus::Stopped,
            _ => ServiceStatus::Unknown,
        })
    }
}

/// Write `contents` to `path` and set its permission bits.
pub(crate) fn write_file(path: &Path, contents: &str, mode: u32) -> Result<(), ServiceError> {
    let io_error = |source| ServiceError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(io_error)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::service::command::CommandOutput;
    use crate::service::testing::ScriptedRunner;

    fn manager(dir: &Path, runner: Arc<ScriptedRunner>) -> SystemdManager {
        let descriptor = ServiceDescriptor::new(
            &ServiceConfig::default(),
            PathBuf::from("/opt/sdp/initservices-responder"),
            PathBuf::from("/opt/sdp"),
            Some("192.168.1.20".parse().unwrap()),
            None,
            Some(ScriptTemplate::SystemdUnit),
        );
        SystemdManager::new(descriptor, runner, dir.to_path_buf())
    }

    #[test]
    fn install_writes_unit_and_enables() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::default());
        let manager = manager(dir.path(), runner.clone());

        manager.install().unwrap();

        let unit = fs::read_to_string(dir.path().join("lgtv-sdp.service")).unwrap();
        assert!(unit.contains("ExecStart=/opt/sdp/initservices-responder -s run 192.168.1.20"));
        assert_eq!(
            runner.calls(),
            vec![
                "systemctl daemon-reload",
                "systemctl enable lgtv-sdp.service"
            ]
        );
    }

    #[test]
    fn install_refuses_existing_unit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lgtv-sdp.service"), "").unwrap();
        let runner = Arc::new(ScriptedRunner::default());

        let err = manager(dir.path(), runner.clone()).install().unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyInstalled { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn uninstall_disables_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::default());
        let manager = manager(dir.path(), runner.clone());
        manager.install().unwrap();

        manager.uninstall().unwrap();
        assert!(!dir.path().join("lgtv-sdp.service").exists());
        assert_eq!(
            runner.calls()[2..],
            [
                "systemctl disable lgtv-sdp.service",
                "systemctl daemon-reload"
            ]
        );
    }

    #[test]
    fn status_reads_is_active_state() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lgtv-sdp.service"), "").unwrap();

        for (state, code, expected) in [
            ("active\n", 0, ServiceStatus::Running),
            ("inactive\n", 3, ServiceStatus::Stopped),
            ("failed\n", 3, ServiceStatus::Stopped),
            ("maintenance\n", 4, ServiceStatus::Unknown),
        ] {
            let runner = Arc::new(ScriptedRunner::default());
            runner.respond(
                "systemctl is-active lgtv-sdp.service",
                CommandOutput {
                    exit_code: Some(code),
                    stdout: state.to_string(),
                    stderr: String::new(),
                },
            );
            assert_eq!(manager(dir.path(), runner).status().unwrap(), expected);
        }
    }

    #[test]
    fn status_without_unit_is_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::default());
        let err = manager(dir.path(), runner).status().unwrap_err();
        assert!(matches!(err, ServiceError::NotInstalled { .. }));
    }

    #[test]
    fn failed_control_call_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::default());
        runner.respond("systemctl start lgtv-sdp.service", CommandOutput::exited(5));

        let err = manager(dir.path(), runner).start().unwrap_err();
        assert!(matches!(err, ServiceError::CommandFailed { exit_code: Some(5), .. }));
    }
}
