// Managed-device list parser (aggregator only).

use roxmltree::Node;

use super::xml::Fields;
use super::{Record, Strategy, extract};
use crate::model::ManagedDevice;

const DEVICES: &[Strategy<ManagedDevice>] = &[
    Strategy::path("devices", &["devices", "entry"]),
    Strategy::path("wrapped devices", &["*", "devices", "entry"]),
    Strategy::path("entries", &["entry"]),
];

impl Record for ManagedDevice {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            serial: f.text(&["serial", "name"]),
            hostname: f.text(&["hostname", "devicename"]),
            ip_address: f.text(&["ip-address", "ipv4"]),
            model: f.text(&["model"]),
            family: f.text(&["family"]),
            sw_version: f.text(&["sw-version"]),
            connected: f.flag(&["connected"]),
            ha_state: f.text(&["ha/state", "ha-state"]),
            multi_vsys: f.flag(&["multi-vsys"]),
            uptime: f.text(&["uptime"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.serial.is_empty()
    }
}

pub(crate) fn managed_devices(payload: &str) -> Vec<ManagedDevice> {
    extract(payload, DEVICES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devices_with_ha_and_connection_state() {
        let payload = r#"<devices>
            <entry name="0011223344"><serial>0011223344</serial><connected>yes</connected>
              <hostname>fw-branch-1</hostname><ip-address>10.1.0.1</ip-address>
              <model>PA-440</model><sw-version>11.1.2</sw-version>
              <ha><state>active</state></ha></entry>
            <entry name="0011223355"><connected>no</connected><hostname>fw-branch-2</hostname></entry>
            <entry><hostname>ghost</hostname></entry>
        </devices>"#;
        let devices = managed_devices(payload);
        assert_eq!(devices.len(), 2);
        assert!(devices[0].connected);
        assert_eq!(devices[0].ha_state, "active");
        assert_eq!(devices[1].serial, "0011223355");
        assert!(!devices[1].connected);
    }
}
