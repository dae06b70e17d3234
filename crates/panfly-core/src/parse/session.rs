// Session table and session-info parsers.

use roxmltree::Node;

use super::xml::Fields;
use super::{Record, Strategy, extract};
use crate::model::{Session, SessionInfo};

const SESSIONS: &[Strategy<Session>] = &[
    Strategy::path("entries", &["entry"]),
    Strategy::path("wrapped entries", &["*", "entry"]),
    Strategy::path("per-dataplane entries", &["*", "*", "entry"]),
];

impl Record for Session {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            id: f.uint(&["idx", "id", "session-id"]),
            vsys: f.text(&["vsys"]),
            application: f.text(&["application", "app"]),
            state: f.text(&["state"]),
            session_type: f.text(&["type"]),
            source: f.text(&["source", "src"]),
            destination: f.text(&["dst", "destination"]),
            source_port: f.port(&["sport", "source-port"]),
            destination_port: f.port(&["dport", "destination-port"]),
            protocol: f.port(&["proto", "protocol"]),
            from_zone: f.text(&["from", "from-zone"]),
            to_zone: f.text(&["to", "to-zone"]),
            nat_source: f.text(&["xsource", "xsrc"]),
            nat_destination: f.text(&["xdst", "xdestination"]),
            nat_source_port: f.port(&["xsport"]),
            nat_destination_port: f.port(&["xdport"]),
            rule: f.text(&["security-rule", "rule"]),
            user: f.text(&["srcuser", "source-user"]),
            bytes: f.uint(&["total-byte-count", "bytes"]),
            start_time: f.time(&["start-time"]),
        }
    }

    fn is_valid(&self) -> bool {
        self.id != 0 || (!self.source.is_empty() && !self.destination.is_empty())
    }
}

pub(crate) fn sessions(payload: &str) -> Vec<Session> {
    extract(payload, SESSIONS)
}

const SESSION_INFO: &[Strategy<SessionInfo>] = &[
    Strategy::path("root counters", &[]),
    Strategy::path("wrapped counters", &["*"]),
];

impl Record for SessionInfo {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            max_sessions: f.uint(&["num-max", "max-sessions"]),
            active_sessions: f.uint(&["num-active", "active-sessions"]),
            active_tcp: f.uint(&["num-tcp"]),
            active_udp: f.uint(&["num-udp"]),
            active_icmp: f.uint(&["num-icmp"]),
            packets_per_second: f.uint(&["pps"]),
            throughput_kbps: f.uint(&["kbps"]),
            connections_per_second: f.uint(&["cps"]),
        }
    }

    fn is_valid(&self) -> bool {
        self.max_sessions > 0
    }
}

pub(crate) fn session_info(payload: &str) -> Option<SessionInfo> {
    extract(payload, SESSION_INFO).into_iter().next()
}
