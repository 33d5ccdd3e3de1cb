//! The native service-manager abstraction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::service::command::CommandRunner;
use crate::service::init_script::InitScriptManager;
use crate::service::systemd::SystemdManager;
use crate::service::{HostPlatform, ServiceDescriptor, ServiceError, ServiceStatus};

/// Verbs accepted by [`control`].
pub const CONTROL_ACTIONS: [&str; 5] = ["start", "stop", "restart", "install", "uninstall"];

/// An OS-native mechanism that can register and control one service.
pub trait ServiceManager {
    /// Name of the underlying init system, for progress messages.
    fn platform_name(&self) -> &'static str;

    /// Register the service with the init system.
    fn install(&self) -> Result<(), ServiceError>;

    /// Remove the registration.
    fn uninstall(&self) -> Result<(), ServiceError>;

    fn start(&self) -> Result<(), ServiceError>;

    fn stop(&self) -> Result<(), ServiceError>;

    fn restart(&self) -> Result<(), ServiceError>;

    /// Ask the init system whether the service is running.
    fn status(&self) -> Result<ServiceStatus, ServiceError>;

    /// Init script this manager installs, for hosts where it can be invoked directly.
    fn init_script(&self) -> Option<&Path> {
        None
    }
}

/// Dispatch a control verb to `manager`.
pub fn control(manager: &dyn ServiceManager, action: &str) -> Result<(), ServiceError> {
    match action {
        "start" => manager.start(),
        "stop" => manager.stop(),
        "restart" => manager.restart(),
        "install" => manager.install(),
        "uninstall" => manager.uninstall(),
        other => Err(ServiceError::UnknownAction {
            action: other.to_string(),
            valid: CONTROL_ACTIONS.join(", "),
        }),
    }
}

/// Build the native manager for `platform`.
///
/// `root` is the filesystem root unit files and scripts are written under;
/// it is `/` outside of tests.
pub fn manager_for(
    platform: HostPlatform,
    descriptor: ServiceDescriptor,
    runner: Arc<dyn CommandRunner>,
    root: &Path,
) -> Result<Box<dyn ServiceManager>, ServiceError> {
    match platform {
        HostPlatform::Systemd => Ok(Box::new(SystemdManager::new(
            descriptor,
            runner,
            root.join(PathBuf::from("etc/systemd/system")),
        ))),
        HostPlatform::InitScript(flavor) => Ok(Box::new(InitScriptManager::new(
            descriptor, flavor, runner, root,
        ))),
        HostPlatform::Unsupported => Err(ServiceError::Unsupported {
            os: std::env::consts::OS.to_string(),
        }),
    }
}
