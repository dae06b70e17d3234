// ── Aggregator-managed devices ──

use serde::{Deserialize, Serialize};

/// A firewall managed by the aggregator (`show devices all`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManagedDevice {
    pub serial: String,
    pub hostname: String,
    pub ip_address: String,
    pub model: String,
    pub family: String,
    pub sw_version: String,
    pub connected: bool,
    pub ha_state: String,
    pub multi_vsys: bool,
    pub uptime: String,
}
