// ── Log records ──

use chrono::{DateTime, Utc};
use panfly_api::JobState;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Log database queried by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LogType {
    Traffic,
    Threat,
    System,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficLogEntry {
    pub seqno: String,
    pub receive_time: Option<DateTime<Utc>>,
    pub serial: String,
    pub subtype: String,
    pub source: String,
    pub destination: String,
    pub source_port: u16,
    pub destination_port: u16,
    pub protocol: String,
    pub application: String,
    pub action: String,
    pub rule: String,
    pub from_zone: String,
    pub to_zone: String,
    pub user: String,
    pub bytes: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets: u64,
    pub session_end_reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreatLogEntry {
    pub seqno: String,
    pub receive_time: Option<DateTime<Utc>>,
    pub serial: String,
    pub subtype: String,
    /// Threat name with its numeric id, as reported.
    pub threat: String,
    pub severity: String,
    pub direction: String,
    pub action: String,
    pub source: String,
    pub destination: String,
    pub application: String,
    pub rule: String,
    pub category: String,
    /// URL or file name, depending on subtype.
    pub misc: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemLogEntry {
    pub seqno: String,
    pub receive_time: Option<DateTime<Utc>>,
    pub serial: String,
    pub subtype: String,
    pub event_id: String,
    pub severity: String,
    pub module: String,
    pub object: String,
    pub description: String,
}

/// Log entries plus how the underlying job ended.
///
/// `state == TimedOut` means the entries are whatever the appliance had
/// collected when the polling budget ran out.
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery<T> {
    pub job_id: String,
    pub state: JobState,
    pub entries: Vec<T>,
}

impl<T> LogQuery<T> {
    pub fn is_complete(&self) -> bool {
        self.state == JobState::Finished
    }
}
