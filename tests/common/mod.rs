// Shared helpers for integration tests.
//
// Provides a temporary directory standing in for the host filesystem, a
// scripted executor that answers package manager and systemctl calls, and
// a release client serving a real tarball, so each integration test can run
// whole commands without root or network access.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use kanata_setup::error::InstallError;
use kanata_setup::exec::{ExecResult, Executor};
use kanata_setup::logging::{Log, Logger};
use kanata_setup::platform::{Distro, Platform};
use kanata_setup::resources::release::{Release, ReleaseAsset, ReleaseClient};
use kanata_setup::settings::Settings;
use kanata_setup::tasks::Context;

/// Name of the tarball served by [`StubReleases`].
pub const ASSET_NAME: &str = "kanata-linux-x86_64.tar.gz";

/// Executor that answers from a script instead of touching the host.
///
/// Every command succeeds with empty output unless its command line starts
/// with a registered failure prefix.  `tar` is passed through to the real
/// tool so release archives are genuinely unpacked.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    programs: Mutex<HashMap<String, PathBuf>>,
    failures: HashSet<String>,
    outputs: HashMap<String, String>,
    installs: HashMap<String, (String, PathBuf)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// A host reporting `x86_64` from `uname -m` with `tar` on `PATH`.
    pub fn new() -> Self {
        Self::default()
            .with_program("tar", "/usr/bin/tar")
            .with_output("uname -m", "x86_64\n")
    }

    /// Resolve `program` on `PATH` to `path`.
    pub fn with_program(self, program: &str, path: &str) -> Self {
        self.programs
            .lock()
            .expect("programs lock")
            .insert(program.to_string(), PathBuf::from(path));
        self
    }

    /// Fail every command line that starts with `prefix`.
    pub fn failing(mut self, prefix: &str) -> Self {
        self.failures.insert(prefix.to_string());
        self
    }

    /// Answer command lines starting with `prefix` with `stdout`.
    pub fn with_output(mut self, prefix: &str, stdout: &str) -> Self {
        self.outputs.insert(prefix.to_string(), stdout.to_string());
        self
    }

    /// After a successful command line starting with `prefix`, resolve
    /// `program` on `PATH` to `path`.
    pub fn installing(mut self, prefix: &str, program: &str, path: &str) -> Self {
        self.installs
            .insert(prefix.to_string(), (program.to_string(), PathBuf::from(path)));
        self
    }

    /// Every command line issued so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Whether any issued command line starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn respond(&self, line: &str) -> ExecResult {
        let failed = self.failures.iter().any(|p| line.starts_with(p.as_str()));
        if !failed {
            for (prefix, (program, path)) in &self.installs {
                if line.starts_with(prefix.as_str()) {
                    self.programs
                        .lock()
                        .expect("programs lock")
                        .insert(program.clone(), path.clone());
                }
            }
        }
        let stdout = self
            .outputs
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        ExecResult {
            stdout,
            stderr: if failed {
                format!("scripted failure: {line}")
            } else {
                String::new()
            },
            success: !failed,
            code: Some(i32::from(failed)),
        }
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            anyhow::bail!("{program} failed (exit 1): {}", result.stderr);
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());

        if program == "tar" {
            let output = Command::new("tar").args(args).output()?;
            return Ok(ExecResult::from(output));
        }
        Ok(self.respond(&line))
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        self.programs
            .lock()
            .expect("programs lock")
            .get(program)
            .cloned()
    }
}

/// Release client serving one release whose Linux asset is a real gzipped
/// tarball containing `kanata-1.8.1/kanata`.
#[derive(Debug)]
pub struct StubReleases {
    archive: PathBuf,
    queries: AtomicUsize,
    _staging: tempfile::TempDir,
}

impl StubReleases {
    /// Build the tarball in a private staging directory.
    pub fn new() -> Arc<Self> {
        let staging = tempfile::tempdir().expect("staging dir");
        let tree = staging.path().join("tree/kanata-1.8.1");
        std::fs::create_dir_all(&tree).expect("create tree");
        std::fs::write(tree.join("kanata"), "#!/bin/sh\necho kanata\n").expect("write binary");
        std::fs::write(tree.join("README.md"), "kanata\n").expect("write readme");

        let archive = staging.path().join(ASSET_NAME);
        let status = Command::new("tar")
            .arg("-czf")
            .arg(&archive)
            .arg("-C")
            .arg(staging.path().join("tree"))
            .arg(".")
            .status()
            .expect("run tar");
        assert!(status.success(), "tar -czf failed");

        Arc::new(Self {
            archive,
            queries: AtomicUsize::new(0),
            _staging: staging,
        })
    }

    /// Number of release metadata queries so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl ReleaseClient for StubReleases {
    fn latest_release(&self, _repo: &str) -> Result<Release, InstallError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(Release {
            tag_name: "v1.8.1".to_string(),
            assets: vec![
                ReleaseAsset {
                    name: "kanata-macos-x86_64.tar.gz".to_string(),
                    browser_download_url: "https://example.invalid/macos".to_string(),
                },
                ReleaseAsset {
                    name: ASSET_NAME.to_string(),
                    browser_download_url: "https://example.invalid/linux".to_string(),
                },
            ],
        })
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), InstallError> {
        std::fs::copy(&self.archive, dest)
            .map(|_| ())
            .map_err(|e| InstallError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

/// A temporary directory standing in for the host filesystem.
pub struct Sandbox {
    /// Temporary root; every system path in [`Sandbox::settings`] lives below it.
    pub root: tempfile::TempDir,
    /// Settings pointing into the sandbox.
    pub settings: Settings,
}

impl Sandbox {
    /// Create an empty sandbox (no keyboard configuration yet).
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let settings = Settings {
            bin_dir: root.path().join("usr/local/bin"),
            config_source_dir: root.path().join("work"),
            config_dir: root.path().join("etc/kanata"),
            unit_dir: root.path().join("etc/systemd/system"),
            ..Settings::default()
        };
        std::fs::create_dir_all(&settings.config_source_dir).expect("create work dir");
        Self { root, settings }
    }

    /// Create a sandbox with a keyboard configuration in the working directory.
    pub fn with_config() -> Self {
        let sandbox = Self::new();
        sandbox.write_config("(defsrc caps)\n(deflayer base esc)\n");
        sandbox
    }

    /// Overwrite the keyboard configuration in the working directory.
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.settings.config_source(), content).expect("write config");
    }

    /// Replace the sandbox root in `text` with `<root>`.
    pub fn redact(&self, text: &str) -> String {
        text.replace(&self.root.path().display().to_string(), "<root>")
    }

    /// Contents of the generated unit file, if any.
    pub fn unit_file(&self) -> Option<String> {
        std::fs::read_to_string(self.settings.unit_path()).ok()
    }

    /// Contents of the installed keyboard configuration, if any.
    pub fn installed_config(&self) -> Option<String> {
        std::fs::read_to_string(self.settings.installed_config()).ok()
    }

    /// Build a command context for `distro` running as `euid`.
    pub fn context(
        &self,
        distro: Distro,
        euid: u32,
        executor: Arc<ScriptedExecutor>,
        releases: Arc<StubReleases>,
        log: &Arc<Logger>,
    ) -> Context {
        Context::new(
            Arc::new(self.settings.clone()),
            Arc::new(Platform::new(distro, euid)),
            Arc::clone(log) as Arc<dyn Log>,
            executor,
            releases,
        )
    }

    /// Every file below the sandbox root, relative to it, sorted.
    pub fn files(&self) -> Vec<String> {
        fn walk(dir: &Path, base: &Path, out: &mut Vec<String>) {
            for entry in std::fs::read_dir(dir).expect("read dir") {
                let path = entry.expect("dir entry").path();
                if path.is_dir() {
                    walk(&path, base, out);
                } else {
                    let rel = path.strip_prefix(base).expect("strip prefix");
                    out.push(rel.display().to_string());
                }
            }
        }
        let mut out = Vec::new();
        walk(self.root.path(), self.root.path(), &mut out);
        out.sort();
        out
    }
}

/// A fresh logger for one command run.
pub fn logger() -> Arc<Logger> {
    Arc::new(Logger::new(None))
}
