//! Managed-device command handlers (aggregators only).

use tabled::Tabled;

use panfly_core::ManagedDevice;

use crate::cli::{DevicesArgs, DevicesCommand, TargetCommand};
use crate::config;
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::Ctx;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "HA")]
    ha: String,
    #[tabled(rename = "Connected")]
    connected: String,
}

pub async fn handle(ctx: &Ctx<'_>, args: DevicesArgs) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { connected } => {
            let mut devices = ctx.firewall.managed_devices(&ctx.cancel).await?;
            if connected {
                devices.retain(|d| d.connected);
            }
            let color = ctx.color;
            let out = output::render_list(
                ctx.global.output,
                &devices,
                |d: &ManagedDevice| DeviceRow {
                    serial: d.serial.clone(),
                    hostname: or_dash(&d.hostname),
                    ip: or_dash(&d.ip_address),
                    model: or_dash(&d.model),
                    version: or_dash(&d.sw_version),
                    ha: or_dash(&d.ha_state),
                    connected: output::status_cell(
                        if d.connected { "yes" } else { "no" },
                        d.connected,
                        color,
                    ),
                },
                |d| d.serial.clone(),
            );
            output::print_output(&out, ctx.global.quiet);
            Ok(())
        }

        DevicesCommand::Target(args) => handle_target(ctx, args.command).await,
    }
}

async fn handle_target(ctx: &Ctx<'_>, cmd: TargetCommand) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let name = ctx.profile_name;

    match cmd {
        TargetCommand::Show => {
            let current = cfg.profiles.get(name).and_then(|p| p.target.clone());
            output::print_output(
                current.as_deref().unwrap_or("(aggregator)"),
                ctx.global.quiet,
            );
            Ok(())
        }

        TargetCommand::Set { serial, no_verify } => {
            if !no_verify {
                let devices = ctx.firewall.managed_devices(&ctx.cancel).await?;
                if !devices.iter().any(|d| d.serial == serial) {
                    return Err(CliError::NotFound {
                        resource_type: "managed device".into(),
                        identifier: serial,
                        list_command: "devices list".into(),
                    });
                }
            }
            let profile = profile_mut(&mut cfg, name)?;
            profile.target = Some(serial.clone());
            let path = panfly_config::save_config(&cfg)?;
            if !ctx.global.quiet {
                eprintln!("Profile '{name}' now targets {serial} ({})", path.display());
            }
            Ok(())
        }

        TargetCommand::Clear => {
            let profile = profile_mut(&mut cfg, name)?;
            profile.target = None;
            panfly_config::save_config(&cfg)?;
            if !ctx.global.quiet {
                eprintln!("Profile '{name}' now addresses the aggregator");
            }
            Ok(())
        }
    }
}

fn profile_mut<'c>(
    cfg: &'c mut panfly_config::Config,
    name: &str,
) -> Result<&'c mut panfly_config::Profile, CliError> {
    let mut available: Vec<String> = cfg.profiles.keys().cloned().collect();
    available.sort_unstable();
    cfg.profiles
        .get_mut(name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: name.to_owned(),
            available: available.join(", "),
        })
}
