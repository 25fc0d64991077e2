//! Keyboard configuration file copied into the system config directory.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::fs::{ensure_parent_dir, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::PrerequisiteError;

/// A configuration file that is copied from `source` to `target`.
#[derive(Debug, Clone)]
pub struct ConfigFileResource {
    /// File supplied by the operator.
    pub source: PathBuf,
    /// Installed location read by the daemon.
    pub target: PathBuf,
}

impl ConfigFileResource {
    /// Create a new configuration file resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Fail with [`PrerequisiteError::MissingConfig`] unless the source exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the source file is absent.
    pub fn require_source(&self) -> Result<(), PrerequisiteError> {
        if self.source.is_file() {
            Ok(())
        } else {
            Err(PrerequisiteError::MissingConfig(self.source.clone()))
        }
    }
}

impl Applicable for ConfigFileResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.require_source()?;
        ensure_parent_dir(&self.target)?;
        std::fs::copy(&self.source, &self.target).with_context(|| {
            format!(
                "copying {} to {}",
                self.source.display(),
                self.target.display()
            )
        })?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if remove_existing(&self.target)? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}

impl Resource for ConfigFileResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("source {} does not exist", self.source.display()),
            });
        }
        if !self.target.exists() {
            return Ok(ResourceState::Missing);
        }
        let wanted = std::fs::read(&self.source)
            .with_context(|| format!("reading {}", self.source.display()))?;
        let current = std::fs::read(&self.target)
            .with_context(|| format!("reading {}", self.target.display()))?;
        if wanted == current {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("{} differs from source", self.target.display()),
            })
        }
    }
}
