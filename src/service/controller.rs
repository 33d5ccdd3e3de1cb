//! Service actions with init-script fallback.
//!
//! # Responsibilities
//! - Map CLI verbs to native manager calls
//! - Retry failed control calls through the init script on init-script hosts
//! - Run `enable`/`disable` where the host needs explicit enablement
//! - Turn the service status into the process exit code
//!
//! # Design Decisions
//! - Every failure is returned; nothing is rolled back
//! - The platform is data resolved once, never re-probed per call

use std::sync::Arc;

use crate::service::command::{run_checked, CommandRunner};
use crate::service::manager::control;
use crate::service::{HostPlatform, ServiceAction, ServiceError, ServiceManager, ServiceStatus};

/// Result of a successfully performed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    Status(ServiceStatus),
}

impl ActionOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            ActionOutcome::Done => 0,
            ActionOutcome::Status(status) => status.exit_code(),
        }
    }
}

/// Performs service actions against one native manager.
pub struct ServiceController {
    manager: Box<dyn ServiceManager>,
    platform: HostPlatform,
    runner: Arc<dyn CommandRunner>,
}

impl ServiceController {
    pub fn new(
        manager: Box<dyn ServiceManager>,
        platform: HostPlatform,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            manager,
            platform,
            runner,
        }
    }

    /// Perform `action`. `Run` is not a control action and is rejected here.
    pub fn perform(&self, action: &ServiceAction) -> Result<ActionOutcome, ServiceError> {
        tracing::info!("Service action: {}", action);

        let outcome = match action {
            ServiceAction::Status => ActionOutcome::Status(self.status()?),
            ServiceAction::Install => {
                self.install()?;
                ActionOutcome::Done
            }
            ServiceAction::Uninstall => {
                self.uninstall()?;
                ActionOutcome::Done
            }
            ServiceAction::Start | ServiceAction::Stop | ServiceAction::Restart => {
                self.control_with_fallback(action.verb())?;
                ActionOutcome::Done
            }
            ServiceAction::Run | ServiceAction::Other(_) => {
                control(self.manager.as_ref(), action.verb())?;
                ActionOutcome::Done
            }
        };

        tracing::info!(
            "Successfully performed '{}' on {}",
            action,
            self.manager.platform_name()
        );
        Ok(outcome)
    }

    fn install(&self) -> Result<(), ServiceError> {
        self.manager.install()?;
        if self.platform.requires_enable() {
            self.run_script("enable")?;
        }
        self.control_with_fallback("start")?;
        tracing::info!("Service has started");
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        if self.platform.requires_enable() {
            self.run_script("disable")?;
        }
        self.manager.uninstall()
    }

    fn control_with_fallback(&self, verb: &str) -> Result<(), ServiceError> {
        match control(self.manager.as_ref(), verb) {
            Ok(()) => Ok(()),
            Err(e) if self.platform.has_script_fallback() => {
                tracing::warn!(error = %e, verb, "Native control failed, invoking init script");
                self.run_script(verb).map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    fn status(&self) -> Result<ServiceStatus, ServiceError> {
        let status = match self.manager.status() {
            Ok(status) => status,
            Err(e @ ServiceError::NotInstalled { .. }) => return Err(e),
            Err(e) if self.platform.has_script_fallback() => {
                tracing::warn!(error = %e, "Native status query failed, invoking init script");
                let output = self.runner.run(&self.script_path(&e)?, &["status"])?;
                match output.exit_code {
                    Some(0) => ServiceStatus::Running,
                    Some(1) => ServiceStatus::Stopped,
                    _ => ServiceStatus::Unknown,
                }
            }
            Err(e) => return Err(e),
        };

        match status {
            ServiceStatus::Running => tracing::info!("Service is running"),
            ServiceStatus::Stopped => tracing::info!("Service is stopped"),
            ServiceStatus::Unknown => tracing::info!("Service status is unknown"),
        }
        Ok(status)
    }

    /// Invoke the init script directly with `verb`; a non-zero exit is an error.
    fn run_script(&self, verb: &str) -> Result<(), ServiceError> {
        let script = self.manager.init_script().ok_or(ServiceError::NoInitScript {
            action: verb.to_string(),
        })?;
        run_checked(self.runner.as_ref(), &script.to_string_lossy(), &[verb]).map(|_| ())
    }

    fn script_path(&self, cause: &ServiceError) -> Result<String, ServiceError> {
        match self.manager.init_script() {
            Some(path) => Ok(path.to_string_lossy().into_owned()),
            None => Err(ServiceError::NoInitScript {
                action: format!("status ({})", cause),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::command::CommandOutput;
    use crate::service::testing::{FakeManager, ScriptedRunner};
    use crate::service::InitFlavor;

    const SCRIPT: &str = "/etc/init.d/lgtv-sdp";

    fn controller(
        manager: FakeManager,
        platform: HostPlatform,
        runner: Arc<ScriptedRunner>,
    ) -> ServiceController {
        ServiceController::new(Box::new(manager), platform, runner)
    }

    #[test]
    fn status_exit_codes() {
        for (status, code) in [
            (ServiceStatus::Running, 0),
            (ServiceStatus::Stopped, 1),
            (ServiceStatus::Unknown, 2),
        ] {
            let mut manager = FakeManager::new(None);
            manager.status = status;
            let runner = Arc::new(ScriptedRunner::default());
            let outcome = controller(manager, HostPlatform::Systemd, runner)
                .perform(&ServiceAction::Status)
                .unwrap();
            assert_eq!(outcome, ActionOutcome::Status(status));
            assert_eq!(outcome.exit_code(), code);
        }
    }

    #[test]
    fn status_falls_back_to_script_exit_code() {
        for (script_code, expected) in [
            (0, ServiceStatus::Running),
            (1, ServiceStatus::Stopped),
            (7, ServiceStatus::Unknown),
        ] {
            let mut manager = FakeManager::new(Some(SCRIPT));
            manager.failing = vec!["status"];
            let runner = Arc::new(ScriptedRunner::default());
            runner.respond("/etc/init.d/lgtv-sdp status", CommandOutput::exited(script_code));

            let outcome = controller(
                manager,
                HostPlatform::InitScript(InitFlavor::SysV),
                runner.clone(),
            )
            .perform(&ServiceAction::Status)
            .unwrap();
            assert_eq!(outcome, ActionOutcome::Status(expected));
            assert_eq!(runner.calls(), vec!["/etc/init.d/lgtv-sdp status"]);
        }
    }

    #[test]
    fn stopped_via_fallback_exits_one() {
        let mut manager = FakeManager::new(Some(SCRIPT));
        manager.failing = vec!["status"];
        let runner = Arc::new(ScriptedRunner::default());
        runner.respond("/etc/init.d/lgtv-sdp status", CommandOutput::exited(1));

        let outcome = controller(manager, HostPlatform::InitScript(InitFlavor::SysV), runner)
            .perform(&ServiceAction::Status)
            .unwrap();
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn status_error_without_fallback_is_fatal() {
        let mut manager = FakeManager::new(None);
        manager.failing = vec!["status"];
        let runner = Arc::new(ScriptedRunner::default());

        let err = controller(manager, HostPlatform::Systemd, runner.clone())
            .perform(&ServiceAction::Status)
            .unwrap_err();
        assert!(matches!(err, ServiceError::CommandFailed { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn fallback_script_that_cannot_start_is_fatal() {
        let mut manager = FakeManager::new(Some(SCRIPT));
        manager.failing = vec!["status"];
        let runner = Arc::new(ScriptedRunner::default());
        runner.fail_spawn(SCRIPT);

        let err = controller(manager, HostPlatform::InitScript(InitFlavor::SysV), runner)
            .perform(&ServiceAction::Status)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Spawn { .. }));
    }

    #[test]
    fn missing_script_reports_not_installed() {
        let mut manager = FakeManager::new(Some(SCRIPT));
        manager.installed = false;
        let runner = Arc::new(ScriptedRunner::default());

        let err = controller(manager, HostPlatform::InitScript(InitFlavor::SysV), runner.clone())
            .perform(&ServiceAction::Status)
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotInstalled { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn install_on_systemd_never_enables() {
        let manager = FakeManager::new(None);
        let calls = manager.calls.clone();
        let runner = Arc::new(ScriptedRunner::default());

        let outcome = controller(manager, HostPlatform::Systemd, runner.clone())
            .perform(&ServiceAction::Install)
            .unwrap();
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(*calls.lock().unwrap(), vec!["install", "start"]);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn uninstall_on_sysv_never_disables() {
        let manager = FakeManager::new(Some(SCRIPT));
        let calls = manager.calls.clone();
        let runner = Arc::new(ScriptedRunner::default());

        controller(manager, HostPlatform::InitScript(InitFlavor::SysV), runner.clone())
            .perform(&ServiceAction::Uninstall)
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["uninstall"]);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn procd_install_enables_before_start() {
        let manager = FakeManager::new(Some(SCRIPT));
        let calls = manager.calls.clone();
        let runner = Arc::new(ScriptedRunner::default());

        controller(manager, HostPlatform::InitScript(InitFlavor::Procd), runner.clone())
            .perform(&ServiceAction::Install)
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["install", "start"]);
        assert_eq!(runner.calls(), vec!["/etc/init.d/lgtv-sdp enable"]);
    }

    #[test]
    fn procd_uninstall_disables_first() {
        let manager = FakeManager::new(Some(SCRIPT));
        let calls = manager.calls.clone();
        let runner = Arc::new(ScriptedRunner::default());

        controller(manager, HostPlatform::InitScript(InitFlavor::Procd), runner.clone())
            .perform(&ServiceAction::Uninstall)
            .unwrap();
        assert_eq!(runner.calls(), vec!["/etc/init.d/lgtv-sdp disable"]);
        assert_eq!(*calls.lock().unwrap(), vec!["uninstall"]);
    }

    #[test]
    fn failed_disable_is_fatal_and_keeps_registration() {
        let manager = FakeManager::new(Some(SCRIPT));
        let calls = manager.calls.clone();
        let runner = Arc::new(ScriptedRunner::default());
        runner.respond("/etc/init.d/lgtv-sdp disable", CommandOutput::exited(1));

        let err = controller(manager, HostPlatform::InitScript(InitFlavor::Procd), runner)
            .perform(&ServiceAction::Uninstall)
            .unwrap_err();
        assert!(matches!(err, ServiceError::CommandFailed { .. }));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_start_retries_through_script() {
        for action in [ServiceAction::Start, ServiceAction::Stop, ServiceAction::Restart] {
            let mut manager = FakeManager::new(Some(SCRIPT));
            manager.failing = vec!["start", "stop", "restart"];
            let runner = Arc::new(ScriptedRunner::default());

            controller(manager, HostPlatform::InitScript(InitFlavor::Procd), runner.clone())
                .perform(&action)
                .unwrap();
            assert_eq!(
                runner.calls(),
                vec![format!("/etc/init.d/lgtv-sdp {}", action.verb())]
            );
        }
    }

    #[test]
    fn failed_fallback_is_fatal() {
        let mut manager = FakeManager::new(Some(SCRIPT));
        manager.failing = vec!["stop"];
        let runner = Arc::new(ScriptedRunner::default());
        runner.respond("/etc/init.d/lgtv-sdp stop", CommandOutput::exited(1));

        let err = controller(manager, HostPlatform::InitScript(InitFlavor::SysV), runner)
            .perform(&ServiceAction::Stop)
            .unwrap_err();
        assert!(matches!(err, ServiceError::CommandFailed { exit_code: Some(1), .. }));
    }

    #[test]
    fn failed_start_on_systemd_is_fatal() {
        let mut manager = FakeManager::new(None);
        manager.failing = vec!["start"];
        let runner = Arc::new(ScriptedRunner::default());

        assert!(controller(manager, HostPlatform::Systemd, runner.clone())
            .perform(&ServiceAction::Start)
            .is_err());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn failed_install_does_not_start() {
        let mut manager = FakeManager::new(None);
        manager.failing = vec!["install"];
        let calls = manager.calls.clone();
        let runner = Arc::new(ScriptedRunner::default());

        assert!(controller(manager, HostPlatform::Systemd, runner)
            .perform(&ServiceAction::Install)
            .is_err());
        assert_eq!(*calls.lock().unwrap(), vec!["install"]);
    }

    #[test]
    fn unknown_actions_are_fatal() {
        let manager = FakeManager::new(Some(SCRIPT));
        let runner = Arc::new(ScriptedRunner::default());

        let err = controller(manager, HostPlatform::InitScript(InitFlavor::SysV), runner)
            .perform(&ServiceAction::Other("reload".to_string()))
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownAction { .. }));
    }
}
