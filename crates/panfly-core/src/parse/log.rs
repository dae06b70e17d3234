// Log-job result parsers.

use roxmltree::Node;

use super::xml::Fields;
use super::{Record, Strategy, extract};
use crate::model::{SystemLogEntry, ThreatLogEntry, TrafficLogEntry};

/// Shapes shared by every log type: `<log><logs><entry>` as returned by the
/// job fetch, with or without the `<log>` level.
pub(crate) fn log_entries<T: Record>(payload: &str) -> Vec<T> {
    let strategies = [
        Strategy::path("log/logs", &["log", "logs", "entry"]),
        Strategy::path("logs", &["logs", "entry"]),
        Strategy::path("wrapped log/logs", &["*", "log", "logs", "entry"]),
    ];
    extract(payload, &strategies)
}

const SEQNO: &[&str] = &["seqno", "logid"];
const RECEIVE_TIME: &[&str] = &["receive_time", "time_generated"];

impl Record for TrafficLogEntry {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            seqno: f.text(SEQNO),
            receive_time: f.time(RECEIVE_TIME),
            serial: f.text(&["serial"]),
            subtype: f.text(&["subtype"]),
            source: f.text(&["src"]),
            destination: f.text(&["dst"]),
            source_port: f.port(&["sport"]),
            destination_port: f.port(&["dport"]),
            protocol: f.text(&["proto"]),
            application: f.text(&["app"]),
            action: f.text(&["action"]),
            rule: f.text(&["rule"]),
            from_zone: f.text(&["from"]),
            to_zone: f.text(&["to"]),
            user: f.text(&["srcuser"]),
            bytes: f.uint(&["bytes"]),
            bytes_sent: f.uint(&["bytes_sent"]),
            bytes_received: f.uint(&["bytes_received"]),
            packets: f.uint(&["packets"]),
            session_end_reason: f.text(&["session_end_reason"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.seqno.is_empty() || self.receive_time.is_some()
    }
}

impl Record for ThreatLogEntry {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            seqno: f.text(SEQNO),
            receive_time: f.time(RECEIVE_TIME),
            serial: f.text(&["serial"]),
            subtype: f.text(&["subtype"]),
            threat: f.text(&["threatid", "threat_name"]),
            severity: f.text(&["severity"]),
            direction: f.text(&["direction"]),
            action: f.text(&["action"]),
            source: f.text(&["src"]),
            destination: f.text(&["dst"]),
            application: f.text(&["app"]),
            rule: f.text(&["rule"]),
            category: f.text(&["category", "thr_category"]),
            misc: f.text(&["misc", "filename", "url"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.seqno.is_empty() || self.receive_time.is_some()
    }
}

impl Record for SystemLogEntry {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            seqno: f.text(SEQNO),
            receive_time: f.time(RECEIVE_TIME),
            serial: f.text(&["serial"]),
            subtype: f.text(&["subtype"]),
            event_id: f.text(&["eventid"]),
            severity: f.text(&["severity"]),
            module: f.text(&["module"]),
            object: f.text(&["object"]),
            description: f.text(&["opaque", "description"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.seqno.is_empty() || self.receive_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRAFFIC: &str = r#"<logs count="2" progress="100">
        <entry logid="7212"><seqno>7212</seqno><receive_time>2024/03/12 10:00:00</receive_time>
          <type>TRAFFIC</type><subtype>end</subtype><src>10.0.0.5</src><dst>93.184.216.34</dst>
          <sport>51000</sport><dport>443</dport><proto>tcp</proto><app>ssl</app>
          <action>allow</action><rule>allow-outbound</rule><bytes>5120</bytes></entry>
        <entry logid="7213"><receive_time>2024/03/12 10:00:01</receive_time><app>dns</app></entry>
    </logs>"#;

    #[test]
    fn traffic_entries_from_job_payload() {
        let payload = format!(
            "<job><id>71</id><status>FIN</status></job><log>{TRAFFIC}</log>"
        );
        let entries: Vec<TrafficLogEntry> = log_entries(&payload);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].destination_port, 443);
        assert_eq!(entries[1].seqno, "7213");
    }

    #[test]
    fn logs_with_and_without_log_level_agree() {
        let nested: Vec<TrafficLogEntry> = log_entries(&format!("<log>{TRAFFIC}</log>"));
        let bare: Vec<TrafficLogEntry> = log_entries(TRAFFIC);
        assert_eq!(nested, bare);
    }

    #[test]
    fn threat_and_system_fields() {
        let threats: Vec<ThreatLogEntry> = log_entries(
            "<log><logs><entry logid=\"1\"><threatid>Eicar Test File(39040)</threatid>\
             <severity>medium</severity><misc>eicar.com</misc></entry></logs></log>",
        );
        assert_eq!(threats[0].threat, "Eicar Test File(39040)");
        assert_eq!(threats[0].misc, "eicar.com");

        let system: Vec<SystemLogEntry> = log_entries(
            "<log><logs><entry logid=\"9\"><eventid>auth-success</eventid>\
             <opaque>User admin logged in</opaque></entry></logs></log>",
        );
        assert_eq!(system[0].description, "User admin logged in");
    }

    #[test]
    fn still_running_job_has_no_entries() {
        let entries: Vec<SystemLogEntry> =
            log_entries("<job><status>ACT</status></job><log><logs count=\"0\"/></log>");
        assert!(entries.is_empty());
    }
}
