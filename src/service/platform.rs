//! Host init-system detection.
//!
//! The host is probed once at startup and the result is passed around as a
//! [`HostPlatform`] value. Every probe failure means "not this platform".

use std::fs;
use std::path::{Path, PathBuf};

use crate::service::templates::ScriptTemplate;

/// Marker string identifying OpenWrt in `/etc/os-release`.
const OPENWRT_MARKER: &str = "OpenWrt";

/// Script convention of an init-script host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitFlavor {
    /// Classic System V `/etc/init.d` scripts with rc.d links.
    SysV,
    /// OpenWrt procd scripts, enabled explicitly with `enable`/`disable`.
    Procd,
    /// BSD `rc.subr` scripts under `/usr/local/etc/rc.d`.
    Bsd,
}

impl InitFlavor {
    /// Directory holding init scripts, relative to the filesystem root.
    pub fn script_dir(&self) -> &'static str {
        match self {
            InitFlavor::SysV | InitFlavor::Procd => "etc/init.d",
            InitFlavor::Bsd => "usr/local/etc/rc.d",
        }
    }

    /// Full path of the init script for `name` under `root`.
    pub fn script_path(&self, root: &Path, name: &str) -> PathBuf {
        root.join(self.script_dir()).join(name)
    }
}

/// Service-management capabilities of the running host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    /// systemd is the running init system.
    Systemd,
    /// A legacy init-script convention.
    InitScript(InitFlavor),
    /// No supported service manager.
    Unsupported,
}

impl HostPlatform {
    /// Probe the real host.
    pub fn detect() -> Self {
        Self::detect_with(&HostProbe::system())
    }

    /// Probe using explicit locations, so detection can run against fixtures.
    pub fn detect_with(probe: &HostProbe) -> Self {
        let platform = match probe.os.as_str() {
            "linux" if probe.systemd_dir.is_dir() => HostPlatform::Systemd,
            "linux" if is_openwrt(&probe.os_release) => HostPlatform::InitScript(InitFlavor::Procd),
            "linux" => HostPlatform::InitScript(InitFlavor::SysV),
            "freebsd" => HostPlatform::InitScript(InitFlavor::Bsd),
            _ => HostPlatform::Unsupported,
        };
        tracing::debug!(os = %probe.os, platform = platform.name(), "Detected service platform");
        platform
    }

    /// Short name used in progress messages.
    pub fn name(&self) -> &'static str {
        match self {
            HostPlatform::Systemd => "linux-systemd",
            HostPlatform::InitScript(InitFlavor::SysV) => "unix-systemv",
            HostPlatform::InitScript(InitFlavor::Procd) => "openwrt-procd",
            HostPlatform::InitScript(InitFlavor::Bsd) => "freebsd-rcd",
            HostPlatform::Unsupported => "unsupported",
        }
    }

    /// Whether failed native control calls may be retried through the script itself.
    pub fn has_script_fallback(&self) -> bool {
        matches!(self, HostPlatform::InitScript(_))
    }

    /// Whether install/uninstall must also run the script's `enable`/`disable`.
    pub fn requires_enable(&self) -> bool {
        matches!(self, HostPlatform::InitScript(InitFlavor::Procd))
    }

    /// Template used to render the unit or script for this host.
    pub fn script_template(&self) -> Option<ScriptTemplate> {
        match self {
            HostPlatform::Systemd => Some(ScriptTemplate::SystemdUnit),
            HostPlatform::InitScript(InitFlavor::SysV) => Some(ScriptTemplate::SysV),
            HostPlatform::InitScript(InitFlavor::Procd) => Some(ScriptTemplate::Procd),
            HostPlatform::InitScript(InitFlavor::Bsd) => Some(ScriptTemplate::BsdRc),
            HostPlatform::Unsupported => None,
        }
    }
}

/// Locations inspected by platform detection.
#[derive(Debug, Clone)]
pub struct HostProbe {
    /// Kernel identification, as in `std::env::consts::OS`.
    pub os: String,
    /// Directory that exists only while systemd is PID 1.
    pub systemd_dir: PathBuf,
    /// Distribution identification file.
    pub os_release: PathBuf,
}

impl HostProbe {
    pub fn system() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            systemd_dir: PathBuf::from("/run/systemd/system"),
            os_release: PathBuf::from("/etc/os-release"),
        }
    }
}

fn is_openwrt(os_release: &Path) -> bool {
    fs::read_to_string(os_release)
        .map(|body| body.contains(OPENWRT_MARKER))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_in(dir: &Path, os: &str) -> HostProbe {
        HostProbe {
            os: os.to_string(),
            systemd_dir: dir.join("run/systemd/system"),
            os_release: dir.join("os-release"),
        }
    }

    #[test]
    fn systemd_dir_wins_on_linux() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("run/systemd/system")).unwrap();
        fs::write(dir.path().join("os-release"), "NAME=\"OpenWrt\"").unwrap();

        let platform = HostPlatform::detect_with(&probe_in(dir.path(), "linux"));
        assert_eq!(platform, HostPlatform::Systemd);
        assert!(!platform.has_script_fallback());
        assert!(!platform.requires_enable());
    }

    #[test]
    fn openwrt_marker_selects_procd() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("os-release"),
            "NAME=\"OpenWrt\"\nVERSION=\"21.02.1\"\n",
        )
        .unwrap();

        let platform = HostPlatform::detect_with(&probe_in(dir.path(), "linux"));
        assert_eq!(platform, HostPlatform::InitScript(InitFlavor::Procd));
        assert!(platform.requires_enable());
        assert_eq!(platform.script_template(), Some(ScriptTemplate::Procd));
    }

    #[test]
    fn missing_os_release_is_plain_sysv() {
        let dir = tempfile::tempdir().unwrap();
        let platform = HostPlatform::detect_with(&probe_in(dir.path(), "linux"));
        assert_eq!(platform, HostPlatform::InitScript(InitFlavor::SysV));
        assert!(platform.has_script_fallback());
        assert!(!platform.requires_enable());
    }

    #[test]
    fn freebsd_uses_rc_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let platform = HostPlatform::detect_with(&probe_in(dir.path(), "freebsd"));
        assert_eq!(platform, HostPlatform::InitScript(InitFlavor::Bsd));
        assert_eq!(
            InitFlavor::Bsd.script_path(Path::new("/"), "lgtv-sdp"),
            PathBuf::from("/usr/local/etc/rc.d/lgtv-sdp")
        );
    }

    #[test]
    fn other_kernels_are_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let platform = HostPlatform::detect_with(&probe_in(dir.path(), "macos"));
        assert_eq!(platform, HostPlatform::Unsupported);
        assert_eq!(platform.script_template(), None);
    }
}
