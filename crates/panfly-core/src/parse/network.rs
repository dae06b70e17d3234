// Interface, route, VPN and ARP parsers.

use std::collections::HashMap;

use roxmltree::Node;
use serde_json::Value;

use super::xml::Fields;
use super::{Record, Strategy, extract};
use crate::model::{ArpEntry, Interface, IpsecTunnel, RouteEntry};

// ── Interfaces ──────────────────────────────────────────────────────

const LOGICAL_INTERFACES: &[Strategy<Interface>] = &[
    Strategy::path("ifnet", &["ifnet", "entry"]),
    Strategy::path("wrapped ifnet", &["*", "ifnet", "entry"]),
];

const HARDWARE_INTERFACES: &[Strategy<Interface>] = &[
    Strategy::path("hw", &["hw", "entry"]),
    Strategy::path("wrapped hw", &["*", "hw", "entry"]),
];

const FLAT_INTERFACES: &[Strategy<Interface>] = &[
    Strategy::path("entries", &["entry"]),
    Strategy::path("wrapped entries", &["*", "entry"]),
];

impl Record for Interface {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            name: f.text(&["name"]),
            zone: f.text(&["zone"]),
            virtual_router: f
                .text(&["fwd", "virtual-router"])
                .trim_start_matches("vr:")
                .to_owned(),
            vsys: f.text(&["vsys"]),
            ip: f.text(&["ip", "addr"]),
            tag: f.u32(&["tag"]),
            state: f.text(&["state"]),
            speed: f.text(&["speed"]),
            duplex: f.text(&["duplex"]),
            mac: f.text(&["mac"]),
            mode: f.text(&["mode"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Join logical (`ifnet`) and hardware (`hw`) entries by name. Hardware-only
/// ports are appended after the logical list.
pub(crate) fn interfaces(payload: &str) -> Vec<Interface> {
    let mut logical = extract(payload, LOGICAL_INTERFACES);
    let hardware = extract(payload, HARDWARE_INTERFACES);
    if logical.is_empty() && hardware.is_empty() {
        return extract(payload, FLAT_INTERFACES);
    }

    let index: HashMap<String, usize> = logical
        .iter()
        .enumerate()
        .map(|(i, iface)| (iface.name.clone(), i))
        .collect();

    for hw in hardware {
        match index.get(&hw.name).and_then(|i| logical.get_mut(*i)) {
            Some(iface) => merge_hardware(iface, hw),
            None => logical.push(hw),
        }
    }
    logical
}

fn merge_hardware(iface: &mut Interface, hw: Interface) {
    let fill = |slot: &mut String, value: String| {
        if slot.is_empty() {
            *slot = value;
        }
    };
    fill(&mut iface.state, hw.state);
    fill(&mut iface.speed, hw.speed);
    fill(&mut iface.duplex, hw.duplex);
    fill(&mut iface.mac, hw.mac);
    fill(&mut iface.mode, hw.mode);
}

// ── Routes ──────────────────────────────────────────────────────────

const ROUTES: &[Strategy<RouteEntry>] = &[
    Strategy::path("entries", &["entry"]),
    Strategy::path("wrapped entries", &["*", "entry"]),
    Strategy::json("advanced-routing json", &["json"], advanced_routes),
    Strategy::json("wrapped advanced-routing json", &["*", "json"], advanced_routes),
];

impl Record for RouteEntry {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            virtual_router: f.text(&["virtual-router", "logical-router"]),
            destination: f.text(&["destination", "prefix"]),
            nexthop: f.text(&["nexthop"]),
            metric: f.u32(&["metric"]),
            flags: f.text(&["flags"]),
            age: f.uint(&["age"]),
            interface: f.text(&["interface"]),
            route_table: f.text(&["route-table"]),
            protocol: f.text(&["protocol"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.destination.is_empty()
    }
}

/// `{ "<router>": { "<prefix>": [ { "protocol", "metric", "nexthops": [..] } ] } }`
fn advanced_routes(value: &Value) -> Vec<RouteEntry> {
    let Some(routers) = value.as_object() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (router, prefixes) in routers {
        let Some(prefixes) = prefixes.as_object() else {
            continue;
        };
        for (prefix, paths) in prefixes {
            for path in paths.as_array().into_iter().flatten() {
                let nexthop = path
                    .get("nexthops")
                    .and_then(Value::as_array)
                    .and_then(|hops| hops.first());
                let hop_field = |key: &str| {
                    nexthop
                        .and_then(|hop| hop.get(key))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned()
                };
                let flags = if path.get("selected").and_then(Value::as_bool) == Some(true) {
                    "A"
                } else {
                    ""
                };
                out.push(RouteEntry {
                    virtual_router: router.clone(),
                    destination: path
                        .get("prefix")
                        .and_then(Value::as_str)
                        .unwrap_or(prefix.as_str())
                        .to_owned(),
                    nexthop: hop_field("ip"),
                    metric: path
                        .get("metric")
                        .and_then(Value::as_u64)
                        .and_then(|m| u32::try_from(m).ok())
                        .unwrap_or(0),
                    flags: flags.to_owned(),
                    age: 0,
                    interface: hop_field("interfaceName"),
                    route_table: "unicast".to_owned(),
                    protocol: path
                        .get("protocol")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned(),
                });
            }
        }
    }
    out
}

pub(crate) fn routes(payload: &str) -> Vec<RouteEntry> {
    extract(payload, ROUTES)
}

// ── VPN ─────────────────────────────────────────────────────────────

const TUNNELS: &[Strategy<IpsecTunnel>] = &[
    Strategy::path("flow IPSec", &["IPSec", "entry"]),
    Strategy::path("wrapped flow IPSec", &["*", "IPSec", "entry"]),
    Strategy::path("sa entries", &["entries", "entry"]),
    Strategy::path("wrapped sa entries", &["*", "entries", "entry"]),
    Strategy::path("entries", &["entry"]),
];

impl Record for IpsecTunnel {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            id: f.text(&["id", "tid"]),
            name: f.text(&["name"]),
            gateway: f.text(&["gateway", "gw", "gwid"]),
            local_ip: f.text(&["localip", "local-ip", "local"]),
            peer_ip: f.text(&["peerip", "peer-ip", "remote"]),
            state: f.text(&["state"]),
            inner_interface: f.text(&["inner-if"]),
            outer_interface: f.text(&["outer-if"]),
            encryption: f.text(&["enc", "encryption"]),
            authentication: f.text(&["hash", "auth"]),
            lifetime_secs: f.uint(&["life", "lifetime"]),
            remaining_secs: f.uint(&["remain", "remaining"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

pub(crate) fn vpn_tunnels(payload: &str) -> Vec<IpsecTunnel> {
    extract(payload, TUNNELS)
}

// ── ARP ─────────────────────────────────────────────────────────────

const ARP: &[Strategy<ArpEntry>] = &[
    Strategy::path("entries", &["entries", "entry"]),
    Strategy::path("wrapped entries", &["*", "entries", "entry"]),
    Strategy::path("flat entries", &["entry"]),
];

impl Record for ArpEntry {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            ip: f.text(&["ip"]),
            mac: f.text(&["mac", "hw-address"]),
            interface: f.text(&["interface"]),
            port: f.text(&["port"]),
            status: f.text(&["status"]),
            ttl: f.uint(&["ttl"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.ip.is_empty()
    }
}

pub(crate) fn arp_table(payload: &str) -> Vec<ArpEntry> {
    extract(payload, ARP)
}
