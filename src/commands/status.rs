//! Command: report installation state without changing anything.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::platform::CpuArch;
use crate::resources::systemd_unit::SystemdUnitResource;
use crate::tasks::Context;
use crate::tasks::daemon::installed_binary;

/// Snapshot of what `install` would find on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Detected distribution family.
    pub distro: String,
    /// Release asset token, or the reason none applies.
    pub arch: String,
    /// Where the daemon binary was found, if anywhere.
    pub binary: Option<String>,
    /// Whether the unit file exists on disk.
    pub unit_file: bool,
    /// Whether systemd reports the unit as enabled.
    pub enabled: bool,
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or `systemctl` cannot
/// be spawned.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = super::system_context(global, log)?;
    let status = collect(&ctx)?;
    report(&status, &ctx, log);
    Ok(())
}

/// Probe the host.  Runs no mutating command and needs no privileges.
///
/// # Errors
///
/// Returns an error if `systemctl` cannot be spawned.
pub fn collect(ctx: &Context) -> Result<Status> {
    let arch = CpuArch::detect(&*ctx.executor)
        .map_or_else(|e| e.to_string(), |a| a.to_string());
    let unit = SystemdUnitResource::new(
        ctx.settings.unit_name(),
        ctx.settings.unit_path(),
        String::new(),
        &*ctx.executor,
    );
    let unit_file = unit.path.is_file();
    let enabled = unit.is_enabled()?;

    Ok(Status {
        distro: ctx.platform.distro.to_string(),
        arch,
        binary: installed_binary(ctx).map(|p| p.display().to_string()),
        unit_file,
        enabled,
    })
}

fn report(status: &Status, ctx: &Context, log: &Logger) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    log.stage("Status");
    log.info(&format!("distribution: {}", status.distro));
    log.info(&format!("architecture: {}", status.arch));
    log.info(&format!(
        "{}: {}",
        ctx.settings.binary,
        status.binary.as_deref().unwrap_or("not installed")
    ));
    log.info(&format!(
        "unit file {}: {}",
        ctx.settings.unit_path().display(),
        yes_no(status.unit_file)
    ));
    log.info(&format!(
        "{} enabled: {}",
        ctx.settings.unit_name(),
        yes_no(status.enabled)
    ));
}
