//! System-wide systemd unit resource.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::fs::{ensure_parent_dir, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Render the unit file that starts the daemon at boot.
///
/// The output depends only on the arguments:
///
/// ```
/// use std::path::Path;
/// use kanata_setup::resources::systemd_unit::render_unit;
///
/// let unit = render_unit(
///     "Kanata keyboard remapper",
///     "/sbin/modprobe uinput",
///     Path::new("/usr/bin/kanata"),
///     Path::new("/etc/kanata/configV1.kbd"),
/// );
/// assert!(unit.contains("ExecStart=/usr/bin/kanata --cfg /etc/kanata/configV1.kbd\n"));
/// assert!(unit.ends_with("WantedBy=sysinit.target\n"));
/// ```
///
/// Paths are written as single `ExecStart=` arguments; see [`exec_arg`].
#[must_use]
pub fn render_unit(description: &str, exec_start_pre: &str, binary: &Path, config: &Path) -> String {
    format!(
        "[Unit]\n\
         Description={description}\n\
         Requires=local-fs.target\n\
         After=local-fs.target\n\
         \n\
         [Service]\n\
         ExecStartPre={exec_start_pre}\n\
         ExecStart={} --cfg {}\n\
         Restart=no\n\
         \n\
         [Install]\n\
         WantedBy=sysinit.target\n",
        exec_arg(binary),
        exec_arg(config),
    )
}

/// Render `path` as one argument of an `Exec*=` line.
///
/// `%` is doubled so systemd does not expand it as a specifier.  Paths
/// containing whitespace, quotes or backslashes are double-quoted with
/// `"` and `\` escaped; plain paths are left as they are.
#[must_use]
pub fn exec_arg(path: &Path) -> String {
    let text = path.display().to_string().replace('%', "%%");
    let needs_quotes = text
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';'));
    if !needs_quotes {
        return text;
    }
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// A unit file under the system unit directory, registered with systemd.
#[derive(Debug)]
pub struct SystemdUnitResource<'a> {
    /// Unit name (e.g. `kanata.service`).
    pub name: String,
    /// Location of the unit file.
    pub path: PathBuf,
    /// Unit file contents written by [`apply`](Applicable::apply).
    pub contents: String,
    executor: &'a dyn Executor,
}

impl<'a> SystemdUnitResource<'a> {
    /// Create a new systemd unit resource.
    #[must_use]
    pub const fn new(
        name: String,
        path: PathBuf,
        contents: String,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            name,
            path,
            contents,
            executor,
        }
    }

    /// Whether systemd already knows the unit, either through the unit file
    /// on disk or through `systemctl list-unit-files`.
    ///
    /// # Errors
    ///
    /// Returns an error if `systemctl` cannot be spawned.
    pub fn is_registered(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(true);
        }
        let result = self.executor.run_unchecked(
            "systemctl",
            &["list-unit-files", "--no-legend", &self.name],
        )?;
        Ok(result.success
            && result
                .stdout
                .lines()
                .any(|line| line.split_whitespace().next() == Some(self.name.as_str())))
    }

    /// Whether the unit is enabled (`systemctl is-enabled`).
    ///
    /// # Errors
    ///
    /// Returns an error if `systemctl` cannot be spawned.
    pub fn is_enabled(&self) -> Result<bool> {
        let result = self
            .executor
            .run_unchecked("systemctl", &["is-enabled", &self.name])?;
        Ok(result.success)
    }

    fn daemon_reload(&self) -> Result<()> {
        self.executor.run("systemctl", &["daemon-reload"])?;
        Ok(())
    }
}

impl Applicable for SystemdUnitResource<'_> {
    fn description(&self) -> String {
        self.name.clone()
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, &self.contents)
            .with_context(|| format!("writing {}", self.path.display()))?;
        self.daemon_reload()?;
        self.executor.run("systemctl", &["enable", &self.name])?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if !self.is_registered()? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let disabled = self
            .executor
            .run_unchecked("systemctl", &["disable", "--now", &self.name])?;
        remove_existing(&self.path)?;
        self.daemon_reload()?;
        if disabled.success {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::Skipped {
                reason: format!("failed to disable: {}", disabled.stderr.trim()),
            })
        }
    }
}

impl Resource for SystemdUnitResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.is_registered()? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    fn unit<'a>(dir: &Path, executor: &'a MockExecutor) -> SystemdUnitResource<'a> {
        SystemdUnitResource::new(
            "kanata.service".to_string(),
            dir.join("kanata.service"),
            "[Unit]\n".to_string(),
            executor,
        )
    }

    #[test]
    fn render_unit_matches_template() {
        let rendered = render_unit(
            "Kanata keyboard remapper",
            "/sbin/modprobe uinput",
            Path::new("/usr/local/bin/kanata"),
            Path::new("/etc/kanata/configV1.kbd"),
        );
        insta::assert_snapshot!(rendered, @r"
        [Unit]
        Description=Kanata keyboard remapper
        Requires=local-fs.target
        After=local-fs.target

        [Service]
        ExecStartPre=/sbin/modprobe uinput
        ExecStart=/usr/local/bin/kanata --cfg /etc/kanata/configV1.kbd
        Restart=no

        [Install]
        WantedBy=sysinit.target
        ");
    }

    #[test]
    fn exec_arg_leaves_plain_paths_alone() {
        assert_eq!(exec_arg(Path::new("/etc/kanata/configV1.kbd")), "/etc/kanata/configV1.kbd");
    }

    #[test]
    fn exec_arg_quotes_whitespace() {
        assert_eq!(
            exec_arg(Path::new("/etc/kanata/my layout.kbd")),
            r#""/etc/kanata/my layout.kbd""#
        );
    }

    #[test]
    fn exec_arg_escapes_quotes_and_specifiers() {
        assert_eq!(
            exec_arg(Path::new(r#"/opt/a"b\c.kbd"#)),
            r#""/opt/a\"b\\c.kbd""#
        );
        assert_eq!(exec_arg(Path::new("/opt/100%.kbd")), "/opt/100%%.kbd");
    }

    #[test]
    fn config_path_with_space_stays_one_argument() {
        let unit = render_unit(
            "d",
            "p",
            Path::new("/usr/local/bin/kanata"),
            Path::new("/etc/kanata/my layout.kbd"),
        );
        assert!(unit.contains(
            "ExecStart=/usr/local/bin/kanata --cfg \"/etc/kanata/my layout.kbd\"\n"
        ));
    }

    #[test]
    fn render_unit_is_deterministic() {
        let a = render_unit("d", "p", Path::new("/b"), Path::new("/c"));
        let b = render_unit("d", "p", Path::new("/b"), Path::new("/c"));
        assert_eq!(a, b);
    }

    #[test]
    fn existing_file_counts_as_registered() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockExecutor::default();
        let res = unit(dir.path(), &executor);
        std::fs::write(&res.path, "x").unwrap();

        assert!(res.is_registered().unwrap());
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn listed_unit_counts_as_registered() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockExecutor::ok("kanata.service enabled enabled\n");
        let res = unit(dir.path(), &executor);

        assert_eq!(res.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(
            executor.calls(),
            vec!["systemctl list-unit-files --no-legend kanata.service"]
        );
    }

    #[test]
    fn similarly_named_unit_is_not_registered() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockExecutor::ok("kanata-other.service disabled enabled\n");
        let res = unit(dir.path(), &executor);

        assert!(!res.is_registered().unwrap());
    }

    #[test]
    fn apply_writes_reloads_and_enables() {
        let dir = tempfile::tempdir().unwrap();
        let executor =
            MockExecutor::with_responses(vec![(true, String::new()), (true, String::new())]);
        let res = unit(&dir.path().join("system"), &executor);

        assert_eq!(res.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_to_string(&res.path).unwrap(), "[Unit]\n");
        assert_eq!(
            executor.calls(),
            vec!["systemctl daemon-reload", "systemctl enable kanata.service"]
        );
    }

    #[test]
    fn apply_fails_when_enable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let executor =
            MockExecutor::with_responses(vec![(true, String::new()), (false, String::new())]);
        let res = unit(dir.path(), &executor);

        assert!(res.apply().is_err());
    }

    #[test]
    fn remove_disables_deletes_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let executor =
            MockExecutor::with_responses(vec![(true, String::new()), (true, String::new())]);
        let res = unit(dir.path(), &executor);
        std::fs::write(&res.path, "x").unwrap();

        assert_eq!(res.remove().unwrap(), ResourceChange::Applied);
        assert!(!res.path.exists());
        assert_eq!(
            executor.calls(),
            vec![
                "systemctl disable --now kanata.service",
                "systemctl daemon-reload"
            ]
        );
    }

    #[test]
    fn remove_unregistered_unit_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockExecutor::ok("");
        let res = unit(dir.path(), &executor);

        assert_eq!(res.remove().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn is_enabled_follows_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![
            (true, "enabled\n".to_string()),
            (false, "disabled\n".to_string()),
        ]);
        let res = unit(dir.path(), &executor);
        assert!(res.is_enabled().unwrap());
        assert!(!res.is_enabled().unwrap());
    }
}
