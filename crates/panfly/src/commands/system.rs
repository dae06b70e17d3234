//! System command handlers.

use chrono::Utc;
use tabled::Tabled;

use panfly_core::{Certificate, Environmental, Job, LicenseInfo, ResourceUsage, SystemInfo};

use crate::cli::{SystemArgs, SystemCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines, or_dash, time_cell};

use super::Ctx;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EnvironmentalRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Sensor")]
    description: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Alarm")]
    alarm: String,
}

#[derive(Tabled)]
struct LicenseRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Issued")]
    issued: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct CertificateRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Common Name")]
    common_name: String,
    #[tabled(rename = "Issuer")]
    issuer: String,
    #[tabled(rename = "Not After")]
    not_after: String,
    #[tabled(rename = "CA")]
    ca: String,
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    job_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Enqueued")]
    enqueued: String,
}

// ── Detail views ────────────────────────────────────────────────────

fn info_detail(s: &SystemInfo) -> String {
    detail_lines(&[
        ("Hostname", or_dash(&s.hostname)),
        ("Model", or_dash(&s.model)),
        ("Serial", or_dash(&s.serial)),
        ("Family", or_dash(&s.family)),
        ("Mode", or_dash(&s.operational_mode)),
        ("Address", format!("{} / {}", or_dash(&s.ip_address), or_dash(&s.netmask))),
        ("Gateway", or_dash(&s.default_gateway)),
        ("MAC", or_dash(&s.mac_address)),
        ("Software", or_dash(&s.sw_version)),
        ("App", or_dash(&s.app_version)),
        ("Threat", or_dash(&s.threat_version)),
        ("Antivirus", or_dash(&s.antivirus_version)),
        ("WildFire", or_dash(&s.wildfire_version)),
        ("URL filter", or_dash(&s.url_filtering_version)),
        ("Multi-vsys", s.multi_vsys.to_string()),
        ("Uptime", or_dash(&s.uptime)),
    ])
}

fn resources_detail(r: &ResourceUsage) -> String {
    detail_lines(&[
        ("CPU", format!("{:.1}%", r.cpu_percent)),
        ("Load", format!("{:.2} {:.2} {:.2}", r.load_1, r.load_5, r.load_15)),
        (
            "Memory",
            format!(
                "{:.1}% ({} / {} KiB)",
                r.memory_percent(),
                r.memory_used_kib,
                r.memory_total_kib
            ),
        ),
        ("Swap", format!("{} / {} KiB", r.swap_used_kib, r.swap_total_kib)),
        ("Tasks", r.tasks_total.to_string()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx<'_>, args: SystemArgs) -> Result<(), CliError> {
    let fw = &ctx.firewall;
    let cancel = &ctx.cancel;
    let format = ctx.global.output;
    let color = ctx.color;

    let out = match args.command {
        SystemCommand::Info => {
            let info = fw.system_info(cancel).await?;
            output::render_single(format, &info, info_detail, |s| s.hostname.clone())
        }

        SystemCommand::Resources => {
            let usage = fw.resources(cancel).await?;
            output::render_single(format, &usage, resources_detail, |r| {
                format!("{:.1}", r.cpu_percent)
            })
        }

        SystemCommand::Environmentals => {
            let sensors = fw.environmentals(cancel).await?;
            output::render_list(
                format,
                &sensors,
                |e: &Environmental| EnvironmentalRow {
                    category: e.category.clone(),
                    slot: or_dash(&e.slot),
                    description: e.description.clone(),
                    value: format!("{} {}", e.value, e.unit).trim().to_owned(),
                    alarm: output::status_cell(
                        if e.alarm { "ALARM" } else { "ok" },
                        !e.alarm,
                        color,
                    ),
                },
                |e| e.description.clone(),
            )
        }

        SystemCommand::Licenses => {
            let licenses = fw.licenses(cancel).await?;
            output::render_list(
                format,
                &licenses,
                |l: &LicenseInfo| LicenseRow {
                    feature: l.feature.clone(),
                    issued: time_cell(l.issued),
                    expires: l
                        .expires
                        .map_or_else(|| "never".into(), |_| time_cell(l.expires)),
                    status: output::status_cell(
                        if l.expired { "expired" } else { "valid" },
                        !l.expired,
                        color,
                    ),
                },
                |l| l.feature.clone(),
            )
        }

        SystemCommand::Certificates { expiring_days } => {
            let now = Utc::now();
            let mut certs = fw.certificates(cancel).await?;
            if let Some(days) = expiring_days {
                let window = chrono::Duration::days(days);
                certs.retain(|c| c.expires_within(window, now));
            }
            output::render_list(
                format,
                &certs,
                |c: &Certificate| CertificateRow {
                    name: c.name.clone(),
                    common_name: or_dash(&c.common_name),
                    issuer: or_dash(&c.issuer),
                    not_after: if c.is_expired(now) {
                        output::status_cell(&time_cell(c.not_valid_after), false, color)
                    } else if c.expires_within(chrono::Duration::days(30), now) {
                        output::warn_cell(&time_cell(c.not_valid_after), color)
                    } else {
                        time_cell(c.not_valid_after)
                    },
                    ca: if c.is_ca { "yes".into() } else { String::new() },
                },
                |c| c.name.clone(),
            )
        }

        SystemCommand::Jobs => {
            let jobs = fw.jobs(cancel).await?;
            output::render_list(
                format,
                &jobs,
                |j: &Job| JobRow {
                    id: j.id.clone(),
                    job_type: j.job_type.clone(),
                    status: j.status.clone(),
                    result: output::status_cell(&or_dash(&j.result), j.result != "FAIL", color),
                    progress: format!("{}%", j.progress),
                    enqueued: time_cell(j.enqueued),
                },
                |j| j.id.clone(),
            )
        }
    };

    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
