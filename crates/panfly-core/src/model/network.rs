// ── Network records ──

use serde::{Deserialize, Serialize};

/// A logical interface joined with its hardware state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub zone: String,
    pub virtual_router: String,
    pub vsys: String,
    pub ip: String,
    pub tag: u32,
    pub state: String,
    pub speed: String,
    pub duplex: String,
    pub mac: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteEntry {
    pub virtual_router: String,
    pub destination: String,
    pub nexthop: String,
    pub metric: u32,
    pub flags: String,
    pub age: u64,
    pub interface: String,
    pub route_table: String,
    /// Routing protocol, when the source reports it (advanced routing).
    pub protocol: String,
}

/// An IPsec tunnel, from the flow table or the SA list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IpsecTunnel {
    pub id: String,
    pub name: String,
    pub gateway: String,
    pub local_ip: String,
    pub peer_ip: String,
    pub state: String,
    pub inner_interface: String,
    pub outer_interface: String,
    pub encryption: String,
    pub authentication: String,
    pub lifetime_secs: u64,
    pub remaining_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArpEntry {
    pub ip: String,
    pub mac: String,
    pub interface: String,
    pub port: String,
    /// Single-letter status (`c` complete, `s` static, `i` incomplete, ...).
    pub status: String,
    pub ttl: u64,
}
