//! Top-level subcommand orchestration.
pub mod install;
pub mod status;
pub mod uninstall;
pub mod version;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::error::PrivilegeError;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger, TaskStatus};
use crate::platform::Platform;
use crate::resources::release::GitHubClient;
use crate::settings::Settings;
use crate::tasks::{self, Context, Task};

/// Detect the host, resolve settings, and build the context every command
/// runs against.
///
/// # Errors
///
/// Returns an error if the settings file exists but cannot be read or parsed.
pub fn system_context(global: &GlobalOpts, log: &Arc<Logger>) -> Result<Context> {
    let settings = Settings::load(global.settings.as_deref())?
        .with_overrides(global.config.as_deref(), global.service_name.as_deref());
    let platform = Platform::detect();

    log.debug(&format!("distribution: {}", platform.distro));
    log.debug(&format!("effective uid: {}", platform.euid));
    log.debug(&format!("config source: {}", settings.config_source().display()));
    log.debug(&format!("unit file: {}", settings.unit_path().display()));

    Ok(Context::new(
        Arc::new(settings),
        Arc::new(platform),
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(SystemExecutor),
        Arc::new(GitHubClient::default()),
    )
    .with_dry_run(global.dry_run))
}

/// Refuse to continue unless the process runs as root.
///
/// # Errors
///
/// Returns [`PrivilegeError::NotRoot`] for any other effective user.
pub fn require_root(ctx: &Context) -> Result<(), PrivilegeError> {
    if ctx.platform.is_root() {
        Ok(())
    } else {
        Err(PrivilegeError::NotRoot {
            euid: ctx.platform.euid,
        })
    }
}

/// Execute tasks in order, stopping at the first failure, then print the
/// summary.
///
/// # Errors
///
/// Returns an error if a task failed.
pub fn run_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        if tasks::execute(task, ctx) == TaskStatus::Failed {
            break;
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::Distro;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::TaskResult;
    use crate::tasks::test_helpers::{StubReleases, make_context};

    struct Fixed(&'static str, bool);

    impl Task for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            true
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            if self.1 {
                Ok(TaskResult::Ok)
            } else {
                anyhow::bail!("boom")
            }
        }
    }

    fn context(euid: u32) -> (Context, Arc<Logger>, tempfile::TempDir) {
        let log = Arc::new(Logger::new(None));
        let (ctx, dir) = make_context(
            Distro::Debian,
            Arc::new(MockExecutor::default()),
            StubReleases::none(),
        );
        let ctx = Context {
            platform: Arc::new(Platform::new(Distro::Debian, euid)),
            ..ctx.with_log(Arc::clone(&log) as Arc<dyn Log>)
        };
        (ctx, log, dir)
    }

    #[test]
    fn require_root_rejects_regular_user() {
        let (ctx, _log, _dir) = context(1000);
        let err = require_root(&ctx).unwrap_err();
        assert!(err.to_string().contains("sudo"));
    }

    #[test]
    fn require_root_accepts_root() {
        let (ctx, _log, _dir) = context(0);
        assert!(require_root(&ctx).is_ok());
    }

    #[test]
    fn run_tasks_stops_at_first_failure() {
        let (ctx, log, _dir) = context(0);
        let tasks: Vec<Box<dyn Task>> = vec![
            Box::new(Fixed("first", true)),
            Box::new(Fixed("second", false)),
            Box::new(Fixed("third", true)),
        ];

        let err = run_tasks(tasks.iter().map(Box::as_ref), &ctx, &log).unwrap_err();
        assert_eq!(err.to_string(), "1 task(s) failed");
        let names: Vec<String> = log.task_entries().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn run_tasks_succeeds_when_all_pass() {
        let (ctx, log, _dir) = context(0);
        let tasks: Vec<Box<dyn Task>> = vec![Box::new(Fixed("only", true))];
        run_tasks(tasks.iter().map(Box::as_ref), &ctx, &log).unwrap();
        assert_eq!(log.task_entries().len(), 1);
    }
}
