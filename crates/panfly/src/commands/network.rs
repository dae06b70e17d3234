//! Network command handlers.

use tabled::Tabled;

use panfly_core::{ArpEntry, Interface, IpsecTunnel, RouteEntry};

use crate::cli::{NetworkArgs, NetworkCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::Ctx;

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "VLAN")]
    tag: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Speed/Duplex")]
    link: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "VR")]
    virtual_router: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Next Hop")]
    nexthop: String,
    #[tabled(rename = "Metric")]
    metric: u32,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Interface")]
    interface: String,
}

#[derive(Tabled)]
struct TunnelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Peer")]
    peer_ip: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Encryption")]
    encryption: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
}

#[derive(Tabled)]
struct ArpRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "TTL")]
    ttl: u64,
}

fn link_up(state: &str) -> bool {
    matches!(state, "up" | "active")
}

pub async fn handle(ctx: &Ctx<'_>, args: NetworkArgs) -> Result<(), CliError> {
    let fw = &ctx.firewall;
    let cancel = &ctx.cancel;
    let format = ctx.global.output;
    let color = ctx.color;

    let out = match args.command {
        NetworkCommand::Interfaces => {
            let interfaces = fw.interfaces(cancel).await?;
            output::render_list(
                format,
                &interfaces,
                |i: &Interface| InterfaceRow {
                    name: i.name.clone(),
                    zone: or_dash(&i.zone),
                    ip: or_dash(&i.ip),
                    tag: if i.tag == 0 {
                        "-".into()
                    } else {
                        i.tag.to_string()
                    },
                    state: output::status_cell(&or_dash(&i.state), link_up(&i.state), color),
                    link: format!("{}/{}", or_dash(&i.speed), or_dash(&i.duplex)),
                    mac: or_dash(&i.mac),
                },
                |i| i.name.clone(),
            )
        }

        NetworkCommand::Routes => {
            let routes = fw.routes(cancel).await?;
            output::render_list(
                format,
                &routes,
                |r: &RouteEntry| RouteRow {
                    virtual_router: or_dash(&r.virtual_router),
                    destination: r.destination.clone(),
                    nexthop: or_dash(&r.nexthop),
                    metric: r.metric,
                    flags: or_dash(if r.flags.is_empty() { &r.protocol } else { &r.flags }),
                    interface: or_dash(&r.interface),
                },
                |r| r.destination.clone(),
            )
        }

        NetworkCommand::Vpn => {
            let tunnels = fw.vpn_tunnels(cancel).await?;
            output::render_list(
                format,
                &tunnels,
                |t: &IpsecTunnel| TunnelRow {
                    name: t.name.clone(),
                    gateway: or_dash(&t.gateway),
                    peer_ip: or_dash(&t.peer_ip),
                    state: output::status_cell(&or_dash(&t.state), link_up(&t.state), color),
                    encryption: or_dash(&t.encryption),
                    remaining: if t.remaining_secs == 0 {
                        "-".into()
                    } else {
                        format!("{}s", t.remaining_secs)
                    },
                },
                |t| t.name.clone(),
            )
        }

        NetworkCommand::Arp => {
            let entries = fw.arp_table(cancel).await?;
            output::render_list(
                format,
                &entries,
                |a: &ArpEntry| ArpRow {
                    ip: a.ip.clone(),
                    mac: or_dash(&a.mac),
                    interface: or_dash(&a.interface),
                    status: or_dash(&a.status),
                    ttl: a.ttl,
                },
                |a| a.ip.clone(),
            )
        }
    };

    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
