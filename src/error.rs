//! Domain-specific error types for the installer.
//!
//! Internal modules return typed errors (e.g., [`InstallError`],
//! [`PrerequisiteError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error kinds
//!
//! ```text
//! PrivilegeError     : not running as root
//! PrerequisiteError  : missing config file or tool
//! PlatformError      : unsupported CPU architecture
//! InstallError       : package manager, release download
//! SettingsError      : settings file I/O or syntax
//! ```
//!
//! An artifact that is already in place is not an error: tasks report it as
//! skipped and log a warning.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the privilege guard.
#[derive(Error, Debug)]
pub enum PrivilegeError {
    /// The effective user is not root.
    #[error("must be run as root (effective uid {euid}); try again with sudo")]
    NotRoot {
        /// Effective user id of the current process.
        euid: u32,
    },
}

/// Errors raised when a required input is absent.
#[derive(Error, Debug)]
pub enum PrerequisiteError {
    /// The keyboard configuration file to install does not exist.
    #[error("configuration file not found: {}", .0.display())]
    MissingConfig(PathBuf),

    /// A required external tool is not on `PATH`.
    #[error("required tool '{0}' not found on PATH")]
    MissingTool(String),
}

/// Errors raised for hosts the installer cannot serve.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The CPU architecture has no matching release asset convention.
    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),
}

/// Errors raised while installing the daemon binary.
#[derive(Error, Debug)]
pub enum InstallError {
    /// A package manager invocation failed.
    #[error("{manager} could not install '{package}': {reason}")]
    PackageManager {
        /// Package manager that was invoked.
        manager: String,
        /// Package that was requested.
        package: String,
        /// Captured failure detail.
        reason: String,
    },

    /// The latest release has no asset for this architecture.
    #[error("no release asset in {repo} matches linux/{arch}")]
    NoMatchingAsset {
        /// Repository that was queried.
        repo: String,
        /// Asset token for the host architecture.
        arch: String,
    },

    /// Fetching release metadata or an asset failed.
    #[error("download failed for {url}: {reason}")]
    Download {
        /// URL that was requested.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// The downloaded archive could not be unpacked.
    #[error("failed to extract {}: {reason}", archive.display())]
    Extract {
        /// Archive that was being extracted.
        archive: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// The archive did not contain the expected executable.
    #[error("'{binary}' not found in release archive")]
    BinaryNotFound {
        /// Executable name that was searched for.
        binary: String,
    },
}

/// Errors raised while loading the settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("IO error reading settings file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`](crate::settings::Settings).
    #[error("Invalid settings in {}: {message}", path.display())]
    InvalidSyntax {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn not_root_display_mentions_sudo() {
        let e = PrivilegeError::NotRoot { euid: 1000 };
        assert_eq!(
            e.to_string(),
            "must be run as root (effective uid 1000); try again with sudo"
        );
    }

    #[test]
    fn missing_config_display() {
        let e = PrerequisiteError::MissingConfig(PathBuf::from("./configV1.kbd"));
        assert_eq!(e.to_string(), "configuration file not found: ./configV1.kbd");
    }

    #[test]
    fn missing_tool_display() {
        let e = PrerequisiteError::MissingTool("tar".to_string());
        assert_eq!(e.to_string(), "required tool 'tar' not found on PATH");
    }

    #[test]
    fn unsupported_arch_display() {
        let e = PlatformError::UnsupportedArch("riscv64".to_string());
        assert_eq!(e.to_string(), "unsupported architecture: riscv64");
    }

    #[test]
    fn package_manager_display() {
        let e = InstallError::PackageManager {
            manager: "dnf".to_string(),
            package: "kanata".to_string(),
            reason: "No match for argument".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "dnf could not install 'kanata': No match for argument"
        );
    }

    #[test]
    fn no_matching_asset_display() {
        let e = InstallError::NoMatchingAsset {
            repo: "jtroo/kanata".to_string(),
            arch: "aarch64".to_string(),
        };
        assert!(e.to_string().contains("jtroo/kanata"));
        assert!(e.to_string().contains("linux/aarch64"));
    }

    #[test]
    fn extract_display_includes_archive() {
        let e = InstallError::Extract {
            archive: PathBuf::from("/tmp/k.tar.gz"),
            reason: "unexpected EOF".to_string(),
        };
        assert!(e.to_string().contains("/tmp/k.tar.gz"));
        assert!(e.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn settings_io_has_source() {
        use std::error::Error as StdError;
        let e = SettingsError::Io {
            path: PathBuf::from("/etc/kanata-setup.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/etc/kanata-setup.toml"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<PrivilegeError>();
        assert_send_sync::<PrerequisiteError>();
        assert_send_sync::<PlatformError>();
        assert_send_sync::<InstallError>();
        assert_send_sync::<SettingsError>();
    }

    #[test]
    fn errors_convert_to_anyhow() {
        let _a: anyhow::Error = PlatformError::UnsupportedArch("mips".to_string()).into();
        let b: anyhow::Error = PrerequisiteError::MissingTool("tar".into()).into();
        assert!(b.downcast_ref::<PrerequisiteError>().is_some());
    }
}
