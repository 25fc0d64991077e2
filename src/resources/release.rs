//! Prebuilt daemon binary fetched from the latest GitHub release.
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use super::fs::{find_file_named, install_executable};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::{InstallError, PrerequisiteError};
use crate::exec::Executor;
use crate::platform::CpuArch;

/// TCP connect timeout for GitHub requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for a whole request, including the asset download.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// A published release, as returned by the GitHub releases API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Tag the release was cut from (e.g. `v1.8.1`).
    pub tag_name: String,
    /// Downloadable files attached to the release.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A single file attached to a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    /// File name of the asset.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

/// Source of release metadata and asset downloads.
pub trait ReleaseClient: Send + Sync + std::fmt::Debug {
    /// Fetch the latest release of `repo` (`owner/name`).
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Download`] when the request fails or the
    /// response is not a release document.
    fn latest_release(&self, repo: &str) -> Result<Release, InstallError>;

    /// Download `url` into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Download`] when the request or the write fails.
    fn download(&self, url: &str, dest: &Path) -> Result<(), InstallError>;
}

/// [`ReleaseClient`] that talks to `api.github.com` over HTTPS.
#[derive(Debug)]
pub struct GitHubClient {
    agent: ureq::Agent,
    user_agent: String,
}

impl Default for GitHubClient {
    fn default() -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_global(Some(TRANSFER_TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            user_agent: format!("kanata-setup/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GitHubClient {
    fn get(&self, url: &str) -> Result<ureq::http::Response<ureq::Body>, InstallError> {
        self.agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| download_error(url, e))
    }
}

fn download_error(url: &str, reason: impl std::fmt::Display) -> InstallError {
    InstallError::Download {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

impl ReleaseClient for GitHubClient {
    fn latest_release(&self, repo: &str) -> Result<Release, InstallError> {
        let url = format!("https://api.github.com/repos/{repo}/releases/latest");
        let mut response = self.get(&url)?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| download_error(&url, e))?;
        serde_json::from_str(&body).map_err(|e| download_error(&url, e))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), InstallError> {
        let response = self.get(url)?;
        let mut reader = response.into_body().into_reader();
        let mut file = std::fs::File::create(dest).map_err(|e| download_error(url, e))?;
        std::io::copy(&mut reader, &mut file).map_err(|e| download_error(url, e))?;
        file.flush().map_err(|e| download_error(url, e))
    }
}

/// Pick the first asset built for Linux on `arch` and packaged as a gzipped
/// tarball.
#[must_use]
pub fn select_asset(release: &Release, arch: CpuArch) -> Option<&ReleaseAsset> {
    let token = arch.asset_token();
    release.assets.iter().find(|asset| {
        let name = asset.name.to_lowercase();
        name.contains("linux")
            && name.contains(token)
            && (name.ends_with(".tar.gz") || name.ends_with(".tgz"))
    })
}

/// The daemon binary installed from the latest release archive.
#[derive(Debug)]
pub struct ReleaseBinaryResource<'a> {
    /// Executable name to look for inside the archive.
    pub binary: String,
    /// GitHub `owner/name` to download from.
    pub repo: String,
    /// Host architecture the asset must match.
    pub arch: CpuArch,
    /// Final install location of the executable.
    pub dest: PathBuf,
    scratch_root: Option<PathBuf>,
    client: &'a dyn ReleaseClient,
    executor: &'a dyn Executor,
}

impl<'a> ReleaseBinaryResource<'a> {
    /// Create a new release binary resource.
    #[must_use]
    pub const fn new(
        binary: String,
        repo: String,
        arch: CpuArch,
        dest: PathBuf,
        client: &'a dyn ReleaseClient,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            binary,
            repo,
            arch,
            dest,
            scratch_root: None,
            client,
            executor,
        }
    }

    /// Create the scratch directory under `dir` instead of the system
    /// temporary directory.
    #[must_use]
    pub fn with_scratch_root(mut self, dir: PathBuf) -> Self {
        self.scratch_root = Some(dir);
        self
    }

    fn extract(&self, archive: &Path, into: &Path) -> Result<()> {
        std::fs::create_dir_all(into)
            .with_context(|| format!("creating {}", into.display()))?;
        let archive_str = archive.to_string_lossy();
        let into_str = into.to_string_lossy();
        let result = self
            .executor
            .run_unchecked("tar", &["-xzf", &archive_str, "-C", &into_str])
            .map_err(|e| InstallError::Extract {
                archive: archive.to_path_buf(),
                reason: e.to_string(),
            })?;
        if !result.success {
            return Err(InstallError::Extract {
                archive: archive.to_path_buf(),
                reason: result.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Applicable for ReleaseBinaryResource<'_> {
    fn description(&self) -> String {
        format!("{} from {} ({})", self.binary, self.repo, self.arch)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.executor.which("tar").is_none() {
            return Err(PrerequisiteError::MissingTool("tar".to_string()).into());
        }

        let release = self.client.latest_release(&self.repo)?;
        let asset = select_asset(&release, self.arch).ok_or_else(|| {
            InstallError::NoMatchingAsset {
                repo: self.repo.clone(),
                arch: self.arch.to_string(),
            }
        })?;

        // Removed on drop, on every path out of this function.
        let mut builder = tempfile::Builder::new();
        builder.prefix("kanata-setup-");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("creating scratch directory")?;

        let archive = scratch.path().join(&asset.name);
        self.client
            .download(&asset.browser_download_url, &archive)?;

        let unpacked = scratch.path().join("unpacked");
        self.extract(&archive, &unpacked)?;

        let found = find_file_named(&unpacked, &self.binary)?.ok_or_else(|| {
            InstallError::BinaryNotFound {
                binary: self.binary.clone(),
            }
        })?;
        install_executable(&found, &self.dest)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ReleaseBinaryResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(if self.dest.is_file() {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}
