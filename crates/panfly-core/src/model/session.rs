// ── Session table records ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One active flow from `show session all`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub id: u64,
    pub vsys: String,
    pub application: String,
    pub state: String,
    pub session_type: String,
    pub source: String,
    pub destination: String,
    pub source_port: u16,
    pub destination_port: u16,
    /// IP protocol number.
    pub protocol: u16,
    pub from_zone: String,
    pub to_zone: String,
    pub nat_source: String,
    pub nat_destination: String,
    pub nat_source_port: u16,
    pub nat_destination_port: u16,
    pub rule: String,
    pub user: String,
    pub bytes: u64,
    pub start_time: Option<DateTime<Utc>>,
}

/// Session-table counters from `show session info`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionInfo {
    pub max_sessions: u64,
    pub active_sessions: u64,
    pub active_tcp: u64,
    pub active_udp: u64,
    pub active_icmp: u64,
    pub packets_per_second: u64,
    pub throughput_kbps: u64,
    pub connections_per_second: u64,
}

impl SessionInfo {
    /// Share of the session table in use, 0-100.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn utilization_percent(&self) -> f64 {
        if self.max_sessions == 0 {
            return 0.0;
        }
        self.active_sessions as f64 / self.max_sessions as f64 * 100.0
    }
}
