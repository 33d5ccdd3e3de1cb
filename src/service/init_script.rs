//! Init-script management for SysV, procd and BSD rc hosts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::service::command::{run_checked, CommandRunner};
use crate::service::systemd::write_file;
use crate::service::{InitFlavor, ServiceDescriptor, ServiceError, ServiceManager, ServiceStatus};

/// The `service(8)` wrapper every supported init-script host ships.
const SERVICE: &str = "service";

/// Runlevels that start the service and the link prefix used in them.
const START_LINKS: [(&str, &str); 4] = [("2", "S50"), ("3", "S50"), ("4", "S50"), ("5", "S50")];
const STOP_LINKS: [(&str, &str); 3] = [("0", "K02"), ("1", "K02"), ("6", "K02")];

/// Manages an init script through the host's `service` command.
pub struct InitScriptManager {
    descriptor: ServiceDescriptor,
    flavor: InitFlavor,
    runner: Arc<dyn CommandRunner>,
    root: PathBuf,
    script: PathBuf,
}

impl InitScriptManager {
    pub fn new(
        descriptor: ServiceDescriptor,
        flavor: InitFlavor,
        runner: Arc<dyn CommandRunner>,
        root: &Path,
    ) -> Self {
        let script = flavor.script_path(root, &descriptor.name);
        Self {
            descriptor,
            flavor,
            runner,
            root: root.to_path_buf(),
            script,
        }
    }

    fn service(&self, verb: &str) -> Result<(), ServiceError> {
        run_checked(self.runner.as_ref(), SERVICE, &[&self.descriptor.name, verb]).map(|_| ())
    }

    fn rc_links(&self) -> impl Iterator<Item = PathBuf> + '_ {
        START_LINKS
            .iter()
            .chain(STOP_LINKS.iter())
            .map(move |(level, prefix)| {
                self.root
                    .join(format!("etc/rc{}.d", level))
                    .join(format!("{}{}", prefix, self.descriptor.name))
            })
    }

    fn ensure_installed(&self) -> Result<(), ServiceError> {
        if self.script.exists() {
            Ok(())
        } else {
            Err(ServiceError::NotInstalled {
                name: self.descriptor.name.clone(),
            })
        }
    }
}

impl ServiceManager for InitScriptManager {
    fn platform_name(&self) -> &'static str {
        match self.flavor {
            InitFlavor::SysV => "unix-systemv",
            InitFlavor::Procd => "openwrt-procd",
            InitFlavor::Bsd => "freebsd-rcd",
        }
    }

    fn install(&self) -> Result<(), ServiceError> {
        if self.script.exists() {
            return Err(ServiceError::AlreadyInstalled {
                path: self.script.clone(),
            });
        }

        let template = self
            .descriptor
            .options
            .script
            .ok_or(ServiceError::Template {
                name: "init script",
                message: "no template for this host".to_string(),
            })?;
        let script = template.render(&self.descriptor)?;
        write_file(&self.script, &script, 0o755)?;
        tracing::info!(script = %self.script.display(), "Wrote init script");

        if self.flavor == InitFlavor::SysV && self.descriptor.options.run_at_load {
            for link in self.rc_links() {
                link_script(&self.script, &link);
            }
        }
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        self.ensure_installed()?;

        if self.flavor == InitFlavor::SysV {
            for link in self.rc_links() {
                match fs::remove_file(&link) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => tracing::warn!(link = %link.display(), error = %e, "Could not remove rc link"),
                }
            }
        }

        fs::remove_file(&self.script).map_err(|source| ServiceError::Io {
            path: self.script.clone(),
            source,
        })
    }

    fn start(&self) -> Result<(), ServiceError> {
        self.service("start")
    }

    fn stop(&self) -> Result<(), ServiceError> {
        self.service("stop")
    }

    fn restart(&self) -> Result<(), ServiceError> {
        self.service("restart")
    }

    fn status(&self) -> Result<ServiceStatus, ServiceError> {
        self.ensure_installed()?;

        let output = self
            .runner
            .run(SERVICE, &[&self.descriptor.name, "status"])?;
        // LSB: 3 is "not running"; the bundled scripts use 1.
        Ok(match output.exit_code {
            Some(0) => ServiceStatus::Running,
            Some(1) | Some(3) => ServiceStatus::Stopped,
            _ => ServiceStatus::Unknown,
        })
    }

    fn init_script(&self) -> Option<&Path> {
        Some(&self.script)
    }
}

/// Best-effort rc.d symlink; runlevel directories may not exist on every host.
fn link_script(script: &Path, link: &Path) {
    let Some(dir) = link.parent() else {
        return;
    };
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Skipping missing runlevel directory");
        return;
    }

    #[cfg(unix)]
    {
        if let Err(e) = std::os::unix::fs::symlink(script, link) {
            tracing::warn!(link = %link.display(), error = %e, "Could not create rc link");
        }
    }
    #[cfg(not(unix))]
    let _ = script;
}
