//! Distribution package resource.
use anyhow::Result;

use super::{Applicable, ResourceChange};
use crate::error::InstallError;
use crate::exec::Executor;
use crate::platform::Distro;

/// Package managers the installer knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian and derivatives (`apt-get`).
    Apt,
    /// Fedora and RHEL 8+ (`dnf`).
    Dnf,
    /// Older RHEL/CentOS (`yum`).
    Yum,
    /// Arch Linux (`pacman`).
    Pacman,
    /// openSUSE and SLES (`zypper`).
    Zypper,
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

impl PackageManager {
    /// Pick the package manager for `distro`.
    ///
    /// RHEL-family hosts use `dnf` when it is on `PATH` and `yum` otherwise.
    /// Returns `None` for [`Distro::Unknown`].
    #[must_use]
    pub fn for_distro(distro: Distro, executor: &dyn Executor) -> Option<Self> {
        match distro {
            Distro::Debian => Some(Self::Apt),
            Distro::Rhel if executor.which("dnf").is_some() => Some(Self::Dnf),
            Distro::Rhel => Some(Self::Yum),
            Distro::Arch => Some(Self::Pacman),
            Distro::Suse => Some(Self::Zypper),
            Distro::Unknown => None,
        }
    }

    /// Executable that performs installs.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
        }
    }

    /// Arguments (before the package name) for a non-interactive install.
    #[must_use]
    pub const fn install_args(self) -> &'static [&'static str] {
        match self {
            Self::Apt | Self::Dnf | Self::Yum => &["install", "-y"],
            Self::Pacman => &["-S", "--needed", "--noconfirm"],
            Self::Zypper => &["--non-interactive", "install"],
        }
    }
}

/// A system package installed through the distribution package manager.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    /// Package manager to use.
    pub manager: PackageManager,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, manager: PackageManager, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            manager,
            executor,
        }
    }

    /// The full install command line, for dry-run messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.manager.program().to_string();
        for arg in self.manager.install_args() {
            line.push(' ');
            line.push_str(arg);
        }
        line.push(' ');
        line.push_str(&self.name);
        line
    }
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.manager)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut args: Vec<&str> = self.manager.install_args().to_vec();
        args.push(&self.name);
        let result = self.executor.run_unchecked(self.manager.program(), &args)?;
        if result.success {
            return Ok(ResourceChange::Applied);
        }
        let reason = match result.stderr.trim() {
            "" => result
                .code
                .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit {c}")),
            stderr => stderr.to_string(),
        };
        Err(InstallError::PackageManager {
            manager: self.manager.to_string(),
            package: self.name.clone(),
            reason,
        }
        .into())
    }
}

/// Refresh the apt package index (`apt-get update`).
///
/// # Errors
///
/// Returns an error if `apt-get update` fails.
pub fn refresh_apt_index(executor: &dyn Executor) -> Result<()> {
    executor.run("apt-get", &["update"])?;
    Ok(())
}

/// Register an apt PPA (`add-apt-repository -y <ppa>`).
///
/// # Errors
///
/// Returns an error if `add-apt-repository` is missing or fails.
pub fn add_ppa(ppa: &str, executor: &dyn Executor) -> Result<()> {
    executor.run("add-apt-repository", &["-y", ppa])?;
    Ok(())
}
