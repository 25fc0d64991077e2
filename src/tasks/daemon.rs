//! Task: install the keyboard remapping daemon.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::platform::CpuArch;
use crate::resources::package::{self, PackageManager, PackageResource};
use crate::resources::release::ReleaseBinaryResource;
use crate::resources::{Applicable, Resource};

/// Locate an already installed daemon binary.
///
/// Checks `PATH` first, then the fallback install location.
#[must_use]
pub fn installed_binary(ctx: &Context) -> Option<PathBuf> {
    ctx.executor.which(&ctx.settings.binary).or_else(|| {
        let candidate = ctx.settings.installed_binary();
        candidate.is_file().then_some(candidate)
    })
}

/// Install the daemon with the distribution package manager, falling back to
/// the latest upstream release.
#[derive(Debug)]
pub struct InstallDaemon;

impl Task for InstallDaemon {
    fn name(&self) -> &'static str {
        "Install daemon"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(path) = installed_binary(ctx) {
            ctx.log.warn(&format!(
                "{} is already installed at {}",
                ctx.settings.binary,
                path.display()
            ));
            return Ok(TaskResult::Skipped("already installed".to_string()));
        }

        if ctx.from_release {
            ctx.log.info("package manager bypassed (--from-release)");
            return install_from_release(ctx);
        }

        match PackageManager::for_distro(ctx.platform.distro, &*ctx.executor) {
            None => {
                ctx.log.info(&format!(
                    "no package manager for {} distribution; using release fallback",
                    ctx.platform.distro
                ));
                install_from_release(ctx)
            }
            Some(PackageManager::Apt) => install_with_apt(ctx),
            Some(manager) => install_with_manager(ctx, manager),
        }
    }
}

/// Single package manager invocation, no fallback chain.
fn install_with_manager(ctx: &Context, manager: PackageManager) -> Result<TaskResult> {
    let resource = PackageResource::new(ctx.settings.package.clone(), manager, &*ctx.executor);
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("would run {}", resource.command_line()));
        return Ok(TaskResult::DryRun);
    }
    ctx.log.debug(&format!("installing {}", resource.description()));
    resource.apply()?;
    ctx.log
        .info(&format!("installed {} with {manager}", ctx.settings.package));
    Ok(TaskResult::Ok)
}

/// `apt-get update` + install, then the same again with the PPA added, then
/// the release fallback.
fn install_with_apt(ctx: &Context) -> Result<TaskResult> {
    let exec = &*ctx.executor;
    let resource =
        PackageResource::new(ctx.settings.package.clone(), PackageManager::Apt, exec);

    if ctx.dry_run {
        ctx.log.dry_run("would run apt-get update");
        ctx.log
            .dry_run(&format!("would run {}", resource.command_line()));
        ctx.log.dry_run(&format!(
            "on failure: would add {} and retry, then fall back to the {} release",
            ctx.settings.ppa, ctx.settings.release_repo
        ));
        return Ok(TaskResult::DryRun);
    }

    let first = package::refresh_apt_index(exec).and_then(|()| resource.apply());
    let Err(e) = first else {
        ctx.log
            .info(&format!("installed {} with apt", ctx.settings.package));
        return Ok(TaskResult::Ok);
    };
    ctx.log.warn(&format!("apt install failed: {e:#}"));

    ctx.log.info(&format!("adding {}", ctx.settings.ppa));
    let retry = package::add_ppa(&ctx.settings.ppa, exec)
        .and_then(|()| package::refresh_apt_index(exec))
        .and_then(|()| resource.apply());
    let Err(e) = retry else {
        ctx.log.info(&format!(
            "installed {} from {}",
            ctx.settings.package, ctx.settings.ppa
        ));
        return Ok(TaskResult::Ok);
    };
    ctx.log.warn(&format!("PPA install failed: {e:#}"));

    install_from_release(ctx)
}

/// Download the latest release archive and install the executable it holds.
fn install_from_release(ctx: &Context) -> Result<TaskResult> {
    let arch = CpuArch::detect(&*ctx.executor)?;
    let resource = ReleaseBinaryResource::new(
        ctx.settings.binary.clone(),
        ctx.settings.release_repo.clone(),
        arch,
        ctx.settings.installed_binary(),
        &*ctx.releases,
        &*ctx.executor,
    );

    if !resource.needs_change()? {
        ctx.log.warn(&format!(
            "{} already exists; leaving it in place",
            resource.dest.display()
        ));
        return Ok(TaskResult::Skipped("already installed".to_string()));
    }

    if ctx.dry_run {
        ctx.log.dry_run(&format!(
            "would install {} to {}",
            resource.description(),
            resource.dest.display()
        ));
        return Ok(TaskResult::DryRun);
    }

    ctx.log
        .info(&format!("downloading latest {} release", ctx.settings.release_repo));
    resource.apply()?;
    ctx.log
        .info(&format!("installed {}", resource.dest.display()));
    Ok(TaskResult::Ok)
}
