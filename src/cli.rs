use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the kanata installer.
#[derive(Parser, Debug)]
#[command(
    name = "kanata-setup",
    about = "Install the kanata keyboard remapper and register it as a systemd service",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// TOML file overriding the built-in settings
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Keyboard configuration to install (default: ./configV1.kbd)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Name of the systemd service (without `.service`)
    #[arg(long, global = true, value_name = "NAME")]
    pub service_name: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the daemon and register its service
    Install(InstallOpts),
    /// Disable the service and remove its unit and configuration
    Uninstall(UninstallOpts),
    /// Show what is installed, without changing anything
    Status,
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used to name the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Uninstall(_) => "uninstall",
            Self::Status => "status",
            Self::Version => "version",
        }
    }

    /// Whether the subcommand refuses to run without root.
    #[must_use]
    pub const fn needs_root(&self) -> bool {
        matches!(self, Self::Install(_) | Self::Uninstall(_))
    }

    /// Whether a run as `euid` may open the log file.
    ///
    /// A privileged subcommand started without root fails before doing any
    /// work, so it must not create or truncate anything in the cache
    /// directory either.
    #[must_use]
    pub const fn writes_log_file(&self, euid: u32) -> bool {
        !self.needs_root() || euid == 0
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Install from the latest GitHub release instead of the package manager
    #[arg(long)]
    pub from_release: bool,

    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct UninstallOpts {}
