//! Host detection: distribution family, CPU architecture, effective user.
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::PlatformError;
use crate::exec::Executor;

/// Linux distribution family, as far as package management is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    /// Debian, Ubuntu and derivatives (apt).
    Debian,
    /// Fedora, RHEL, CentOS and derivatives (dnf/yum).
    Rhel,
    /// Arch Linux and derivatives (pacman).
    Arch,
    /// openSUSE and SLES (zypper).
    Suse,
    /// Nothing recognisable; only the release fallback applies.
    Unknown,
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debian => write!(f, "debian"),
            Self::Rhel => write!(f, "rhel"),
            Self::Arch => write!(f, "arch"),
            Self::Suse => write!(f, "suse"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Distro {
    /// Map an os-release `ID` (or one `ID_LIKE` word) to a family.
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "debian" | "ubuntu" | "linuxmint" | "pop" | "elementary" | "kali" | "raspbian" => {
                Some(Self::Debian)
            }
            "fedora" | "rhel" | "centos" | "rocky" | "almalinux" | "ol" | "amzn" => {
                Some(Self::Rhel)
            }
            "arch" | "archlinux" | "manjaro" | "endeavouros" | "garuda" | "artix" => {
                Some(Self::Arch)
            }
            "suse" | "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "sles" => {
                Some(Self::Suse)
            }
            _ => None,
        }
    }

    /// Detect the distribution family by inspecting files under `root`.
    ///
    /// Reads `etc/os-release` (or `usr/lib/os-release`), matching `ID` first
    /// and then each word of `ID_LIKE`.  When neither yields a family, the
    /// legacy marker files are checked.  Returns [`Distro::Unknown`] when
    /// nothing matches.
    #[must_use]
    pub fn detect_in(root: &Path) -> Self {
        let os_release = std::fs::read_to_string(root.join("etc/os-release"))
            .or_else(|_| std::fs::read_to_string(root.join("usr/lib/os-release")));

        if let Ok(content) = os_release {
            let vars = parse_os_release(&content);
            if let Some(distro) = vars.get("ID").and_then(|id| Self::from_id(id)) {
                return distro;
            }
            if let Some(distro) = vars
                .get("ID_LIKE")
                .and_then(|like| like.split_whitespace().find_map(Self::from_id))
            {
                return distro;
            }
        }

        let markers = [
            ("etc/debian_version", Self::Debian),
            ("etc/redhat-release", Self::Rhel),
            ("etc/fedora-release", Self::Rhel),
            ("etc/arch-release", Self::Arch),
            ("etc/SuSE-release", Self::Suse),
        ];
        markers
            .iter()
            .find(|(marker, _)| root.join(marker).exists())
            .map_or(Self::Unknown, |(_, distro)| *distro)
    }
}

/// Parse os-release `KEY=value` lines, stripping optional quotes.
fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_string(), value.to_lowercase())
        })
        .collect()
}

/// CPU architectures for which prebuilt release assets exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuArch {
    /// 64-bit x86.
    X86_64,
    /// 64-bit ARM.
    Aarch64,
}

impl CpuArch {
    /// Map a `uname -m` machine string to a supported architecture.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedArch`] for anything other than
    /// x86-64 or 64-bit ARM.
    pub fn from_machine(machine: &str) -> Result<Self, PlatformError> {
        match machine.trim() {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            other => Err(PlatformError::UnsupportedArch(other.to_string())),
        }
    }

    /// Detect the host architecture from `uname -m`, falling back to the
    /// architecture this binary was compiled for when `uname` is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedArch`] when the machine string is
    /// not a supported architecture.
    pub fn detect(executor: &dyn Executor) -> Result<Self, PlatformError> {
        let machine = executor
            .run_unchecked("uname", &["-m"])
            .ok()
            .filter(|r| r.success && !r.stdout.trim().is_empty())
            .map_or_else(|| std::env::consts::ARCH.to_string(), |r| r.stdout);
        Self::from_machine(&machine)
    }

    /// Token that identifies this architecture in release asset names.
    #[must_use]
    pub const fn asset_token(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for CpuArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_token())
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Distribution family.
    pub distro: Distro,
    /// Effective user id of this process.
    pub euid: u32,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            distro: Distro::detect_in(Path::new("/")),
            euid: effective_uid(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(distro: Distro, euid: u32) -> Self {
        Self { distro, euid }
    }

    /// Whether the process runs with root privileges.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.euid == 0
    }
}

/// Effective user id of this process.
#[must_use]
pub fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    #[allow(unsafe_code)]
    unsafe {
        libc::geteuid()
    }
}
