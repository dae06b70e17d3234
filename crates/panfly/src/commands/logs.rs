//! Log query command handlers.
//!
//! Log searches run as appliance jobs; a search that outlives the poll
//! budget still prints whatever arrived, with a warning on stderr.

use tabled::Tabled;

use panfly_core::{LogQuery, SystemLogEntry, ThreatLogEntry, TrafficLogEntry};

use crate::cli::{LogQueryArgs, LogsArgs, LogsCommand};
use crate::error::CliError;
use crate::output::{self, or_dash, time_cell};

use super::Ctx;

#[derive(Tabled)]
struct TrafficRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "App")]
    application: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Bytes")]
    bytes: u64,
}

#[derive(Tabled)]
struct ThreatRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Threat")]
    threat: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Action")]
    action: String,
}

#[derive(Tabled)]
struct SystemRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Event")]
    event_id: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn severe(severity: &str) -> bool {
    matches!(severity, "critical" | "high")
}

/// Warn on stderr when the job was still running at the last poll.
fn report_incomplete<T>(query: &LogQuery<T>, quiet: bool) {
    if !query.is_complete() && !quiet {
        eprintln!(
            "warning: log job {} did not finish in time; showing {} partial entries",
            query.job_id,
            query.entries.len()
        );
    }
}

pub async fn handle(ctx: &Ctx<'_>, args: LogsArgs) -> Result<(), CliError> {
    let fw = &ctx.firewall;
    let cancel = &ctx.cancel;
    let format = ctx.global.output;
    let quiet = ctx.global.quiet;
    let color = ctx.color;

    let out = match args.command {
        LogsCommand::Traffic(LogQueryArgs { query, max }) => {
            let result = fw
                .traffic_logs_detailed(query.as_deref(), max, cancel)
                .await?;
            report_incomplete(&result, quiet);
            output::render_list(
                format,
                &result.entries,
                |e: &TrafficLogEntry| TrafficRow {
                    time: time_cell(e.receive_time),
                    source: format!("{}:{}", e.source, e.source_port),
                    destination: format!("{}:{}", e.destination, e.destination_port),
                    application: or_dash(&e.application),
                    rule: or_dash(&e.rule),
                    action: output::status_cell(&e.action, e.action == "allow", color),
                    bytes: e.bytes,
                },
                |e| e.seqno.clone(),
            )
        }

        LogsCommand::Threat(LogQueryArgs { query, max }) => {
            let result = fw.threat_logs_detailed(query.as_deref(), max, cancel).await?;
            report_incomplete(&result, quiet);
            output::render_list(
                format,
                &result.entries,
                |e: &ThreatLogEntry| ThreatRow {
                    time: time_cell(e.receive_time),
                    severity: output::status_cell(&e.severity, !severe(&e.severity), color),
                    threat: or_dash(&e.threat),
                    source: e.source.clone(),
                    destination: e.destination.clone(),
                    action: or_dash(&e.action),
                },
                |e| e.seqno.clone(),
            )
        }

        LogsCommand::System(LogQueryArgs { query, max }) => {
            let result = fw.system_logs_detailed(query.as_deref(), max, cancel).await?;
            report_incomplete(&result, quiet);
            output::render_list(
                format,
                &result.entries,
                |e: &SystemLogEntry| SystemRow {
                    time: time_cell(e.receive_time),
                    severity: output::status_cell(&e.severity, !severe(&e.severity), color),
                    event_id: or_dash(&e.event_id),
                    description: e.description.clone(),
                },
                |e| e.seqno.clone(),
            )
        }
    };

    output::print_output(&out, quiet);
    Ok(())
}
