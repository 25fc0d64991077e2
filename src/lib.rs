//! Installer for the kanata keyboard remapping daemon.
//!
//! Installs the daemon with the host's package manager (or from the latest
//! GitHub release when that is not possible), copies the keyboard
//! configuration into `/etc/kanata`, and registers a systemd unit that starts
//! the daemon at boot.
//!
//! The public API is organised into four layers:
//!
//! - **[`settings`]** / **[`platform`]** : what to install and where it runs
//! - **[`resources`]** : idempotent `check + apply` primitives (package, release binary, config file, unit)
//! - **[`tasks`]** : named units of work wired to resources
//! - **[`commands`]** : top-level subcommand orchestration (`install`, `uninstall`, `status`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod settings;
pub mod tasks;
