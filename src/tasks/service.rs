//! Tasks: register and unregister the daemon's systemd service.
use anyhow::Result;

use super::daemon::installed_binary;
use super::{Context, Task, TaskResult};
use crate::resources::config_file::ConfigFileResource;
use crate::resources::systemd_unit::{SystemdUnitResource, render_unit};
use crate::resources::{Applicable, ResourceChange};

fn config_resource(ctx: &Context) -> ConfigFileResource {
    ConfigFileResource::new(
        ctx.settings.config_source(),
        ctx.settings.installed_config(),
    )
}

fn unit_resource(ctx: &Context, contents: String) -> SystemdUnitResource<'_> {
    SystemdUnitResource::new(
        ctx.settings.unit_name(),
        ctx.settings.unit_path(),
        contents,
        &*ctx.executor,
    )
}

/// Copy the keyboard configuration, write the unit file and enable it.
#[derive(Debug)]
pub struct RegisterService;

impl Task for RegisterService {
    fn name(&self) -> &'static str {
        "Register service"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let settings = &ctx.settings;
        if unit_resource(ctx, String::new()).is_registered()? {
            ctx.log.warn(&format!(
                "{} is already registered; leaving it unchanged",
                settings.unit_name()
            ));
            return Ok(TaskResult::Skipped("already registered".to_string()));
        }

        let config = config_resource(ctx);
        config.require_source()?;

        let binary = installed_binary(ctx).unwrap_or_else(|| settings.installed_binary());
        let contents = render_unit(
            &settings.description,
            &settings.exec_start_pre,
            &binary,
            &config.target,
        );
        let unit = unit_resource(ctx, contents);

        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would copy {}", config.description()));
            ctx.log
                .dry_run(&format!("would write {}", unit.path.display()));
            ctx.log.dry_run("would run systemctl daemon-reload");
            ctx.log
                .dry_run(&format!("would run systemctl enable {}", unit.name));
            return Ok(TaskResult::DryRun);
        }

        config.apply()?;
        ctx.log
            .info(&format!("installed {}", config.target.display()));
        unit.apply()?;
        ctx.log.info(&format!(
            "enabled {} ({})",
            unit.name,
            unit.path.display()
        ));
        Ok(TaskResult::Ok)
    }
}

/// Disable the service and remove the unit file and installed configuration.
#[derive(Debug)]
pub struct UnregisterService;

impl Task for UnregisterService {
    fn name(&self) -> &'static str {
        "Unregister service"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let unit = unit_resource(ctx, String::new());
        let config = config_resource(ctx);

        let registered = unit.is_registered()?;
        if !registered && !config.target.exists() {
            ctx.log
                .warn(&format!("{} is not registered", unit.name));
            return Ok(TaskResult::Skipped("already removed".to_string()));
        }

        if ctx.dry_run {
            if registered {
                ctx.log
                    .dry_run(&format!("would run systemctl disable --now {}", unit.name));
                ctx.log
                    .dry_run(&format!("would remove {}", unit.path.display()));
                ctx.log.dry_run("would run systemctl daemon-reload");
            }
            if config.target.exists() {
                ctx.log
                    .dry_run(&format!("would remove {}", config.target.display()));
            }
            return Ok(TaskResult::DryRun);
        }

        match unit.remove()? {
            ResourceChange::Applied => ctx.log.info(&format!("removed {}", unit.name)),
            ResourceChange::AlreadyCorrect => {
                ctx.log.debug(&format!("{} was not registered", unit.name));
            }
            ResourceChange::Skipped { reason } => {
                ctx.log.warn(&format!("{}: {reason}", unit.name));
            }
        }
        if config.remove()? == ResourceChange::Applied {
            ctx.log
                .info(&format!("removed {}", config.target.display()));
        }
        Ok(TaskResult::Ok)
    }
}
