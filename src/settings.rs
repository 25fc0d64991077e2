//! Installer settings: compiled-in defaults with an optional TOML override file.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SettingsError;

/// Everything the installer needs to know about the daemon it sets up.
///
/// Every field has a default, so a settings file only has to name the
/// values it changes:
///
/// ```
/// use kanata_setup::settings::Settings;
///
/// let s: Settings = toml::from_str("service_name = \"kbd\"").unwrap();
/// assert_eq!(s.service_name, "kbd");
/// assert_eq!(s.binary, "kanata");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Executable name of the daemon.
    pub binary: String,
    /// Package name used with the distribution package manager.
    pub package: String,
    /// Supplementary apt source tried when the plain apt install fails.
    pub ppa: String,
    /// GitHub `owner/name` whose latest release provides the fallback binary.
    pub release_repo: String,
    /// Directory the fallback installer places the binary in.
    pub bin_dir: PathBuf,
    /// File name of the keyboard configuration.
    pub config_file: String,
    /// Directory the configuration file is read from.
    pub config_source_dir: PathBuf,
    /// Directory the configuration file is installed into.
    pub config_dir: PathBuf,
    /// Name of the systemd service (without the `.service` suffix).
    pub service_name: String,
    /// Directory the unit file is written to.
    pub unit_dir: PathBuf,
    /// `Description=` of the generated unit.
    pub description: String,
    /// Command run before the daemon starts (loads the uinput module).
    pub exec_start_pre: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: "kanata".to_string(),
            package: "kanata".to_string(),
            ppa: "ppa:kanata-remapper/kanata".to_string(),
            release_repo: "jtroo/kanata".to_string(),
            bin_dir: PathBuf::from("/usr/local/bin"),
            config_file: "configV1.kbd".to_string(),
            config_source_dir: PathBuf::from("."),
            config_dir: PathBuf::from("/etc/kanata"),
            service_name: "kanata".to_string(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            description: "Kanata keyboard remapper".to_string(),
            exec_start_pre: "/sbin/modprobe uinput".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or return the defaults when no path is
    /// given or the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::InvalidSyntax {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Apply command-line overrides on top of the loaded settings.
    ///
    /// `config` replaces both the source directory and the file name.
    #[must_use]
    pub fn with_overrides(mut self, config: Option<&Path>, service_name: Option<&str>) -> Self {
        if let Some(config) = config {
            if let Some(name) = config.file_name() {
                self.config_file = name.to_string_lossy().into_owned();
            }
            self.config_source_dir = config
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        }
        if let Some(name) = service_name {
            self.service_name = name.to_string();
        }
        self
    }

    /// Configuration file the operator supplies.
    #[must_use]
    pub fn config_source(&self) -> PathBuf {
        self.config_source_dir.join(&self.config_file)
    }

    /// Location the configuration file is installed to.
    #[must_use]
    pub fn installed_config(&self) -> PathBuf {
        self.config_dir.join(&self.config_file)
    }

    /// Full unit name, e.g. `kanata.service`.
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{}.service", self.service_name)
    }

    /// Location of the generated unit file.
    #[must_use]
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_name())
    }

    /// Location the fallback installer writes the binary to.
    #[must_use]
    pub fn installed_binary(&self) -> PathBuf {
        self.bin_dir.join(&self.binary)
    }
}
