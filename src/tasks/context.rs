use std::sync::Arc;

use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::release::ReleaseClient;
use crate::settings::Settings;

/// Shared context for task execution.
pub struct Context {
    /// Resolved installer settings (defaults, settings file, CLI overrides).
    pub settings: Arc<Settings>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Skip the package manager and install from the latest release.
    pub from_release: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Release metadata and download source for the fallback installer.
    pub releases: Arc<dyn ReleaseClient>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("from_release", &self.from_release)
            .field("executor", &self.executor)
            .field("releases", &self.releases)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        releases: Arc<dyn ReleaseClient>,
    ) -> Self {
        Self {
            settings,
            platform,
            log,
            dry_run: false,
            from_release: false,
            executor,
            releases,
        }
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Force the release fallback regardless of distribution.
    #[must_use]
    pub fn with_from_release(mut self, from_release: bool) -> Self {
        self.from_release = from_release;
        self
    }

    /// Replace the logger.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn Log>) -> Self {
        self.log = log;
        self
    }
}
