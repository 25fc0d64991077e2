use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Logger;
use crate::tasks::{self, Context, Task};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded, the process is not
/// running as root, or a task fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = super::system_context(global, log)?.with_from_release(opts.from_release);
    execute(&ctx, opts, log)
}

/// Install the daemon and register the service using an existing context.
///
/// # Errors
///
/// Returns an error if the process is not running as root or a task fails.
pub fn execute(ctx: &Context, opts: &InstallOpts, log: &Logger) -> Result<()> {
    super::require_root(ctx)?;

    log.info(&format!("kanata-setup {}", super::version::version()));
    log.info(&format!("distribution: {}", ctx.platform.distro));

    let all_tasks = tasks::all_install_tasks();
    let selected = filter_tasks(&all_tasks, opts);
    super::run_tasks(selected, ctx, log)
}

/// Apply `--only` (takes precedence) or `--skip`, matching task names by
/// case-insensitive substring.
pub fn filter_tasks<'a>(all: &'a [Box<dyn Task>], opts: &InstallOpts) -> Vec<&'a dyn Task> {
    all.iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()))
        })
        .map(AsRef::as_ref)
        .collect()
}
