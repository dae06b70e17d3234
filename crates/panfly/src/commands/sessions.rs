//! Session command handlers.

use tabled::Tabled;

use panfly_core::{Session, SessionFilter, SessionInfo};

use crate::cli::{SessionsArgs, SessionsCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines, or_dash};

use super::Ctx;

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "App")]
    application: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Zones")]
    zones: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&Session> for SessionRow {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id,
            application: or_dash(&s.application),
            source: format!("{}:{}", s.source, s.source_port),
            destination: format!("{}:{}", s.destination, s.destination_port),
            zones: format!("{} → {}", or_dash(&s.from_zone), or_dash(&s.to_zone)),
            rule: or_dash(&s.rule),
            state: or_dash(&s.state),
        }
    }
}

fn info_detail(i: &SessionInfo) -> String {
    detail_lines(&[
        (
            "Active",
            format!(
                "{} / {} ({:.1}%)",
                i.active_sessions,
                i.max_sessions,
                i.utilization_percent()
            ),
        ),
        ("TCP", i.active_tcp.to_string()),
        ("UDP", i.active_udp.to_string()),
        ("ICMP", i.active_icmp.to_string()),
        ("Conn/s", i.connections_per_second.to_string()),
        ("Packets/s", i.packets_per_second.to_string()),
        ("Throughput", format!("{} kbps", i.throughput_kbps)),
    ])
}

pub async fn handle(ctx: &Ctx<'_>, args: SessionsArgs) -> Result<(), CliError> {
    let format = ctx.global.output;

    let out = match args.command {
        SessionsCommand::List { filter } => {
            let filter: SessionFilter = match filter.as_deref() {
                Some(expr) => expr.parse()?,
                None => SessionFilter::default(),
            };
            let sessions = ctx.firewall.sessions(&filter, &ctx.cancel).await?;
            output::render_list(format, &sessions, |s| SessionRow::from(s), |s| s.id.to_string())
        }

        SessionsCommand::Info => {
            let info = ctx.firewall.session_info(&ctx.cancel).await?;
            output::render_single(format, &info, info_detail, |i| {
                i.active_sessions.to_string()
            })
        }
    };

    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
