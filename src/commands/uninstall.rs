//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::logging::Logger;
use crate::tasks::{self, Context};

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded, the process is not
/// running as root, or a task fails.
pub fn run(global: &GlobalOpts, _opts: &UninstallOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = super::system_context(global, log)?;
    execute(&ctx, log)
}

/// Disable the service and remove what `install` registered.
///
/// The daemon binary is left in place.
///
/// # Errors
///
/// Returns an error if the process is not running as root or a task fails.
pub fn execute(ctx: &Context, log: &Logger) -> Result<()> {
    super::require_root(ctx)?;
    let tasks = tasks::all_uninstall_tasks();
    super::run_tasks(tasks.iter().map(Box::as_ref), ctx, log)
}
