// ── Appliance-level records ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of `show system info`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub ip_address: String,
    pub netmask: String,
    pub default_gateway: String,
    pub mac_address: String,
    pub model: String,
    pub serial: String,
    pub family: String,
    pub sw_version: String,
    pub app_version: String,
    pub threat_version: String,
    pub antivirus_version: String,
    pub wildfire_version: String,
    pub url_filtering_version: String,
    /// Uptime as reported, e.g. `"10 days, 2:03:04"`.
    pub uptime: String,
    /// `uptime` normalized to seconds (0 when unparseable).
    pub uptime_secs: u64,
    pub multi_vsys: bool,
    pub operational_mode: String,
}

/// CPU, memory and load figures scraped from `show system resources`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub load_1: f64,
    pub load_5: f64,
    pub load_15: f64,
    pub memory_total_kib: u64,
    pub memory_used_kib: u64,
    pub memory_free_kib: u64,
    pub swap_total_kib: u64,
    pub swap_used_kib: u64,
    pub tasks_total: u64,
}

impl ResourceUsage {
    pub fn memory_percent(&self) -> f64 {
        if self.memory_total_kib == 0 {
            return 0.0;
        }
        ratio(self.memory_used_kib, self.memory_total_kib) * 100.0
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn ratio(num: u64, den: u64) -> f64 {
    num as f64 / den as f64
}

/// One sensor from `show system environmentals`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Environmental {
    /// Sensor family: `thermal`, `fan`, `power`, `power-supply`.
    pub category: String,
    pub slot: String,
    pub description: String,
    pub value: f64,
    /// `C`, `RPM`, `V`, or empty for presence sensors.
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub alarm: bool,
}

/// One installed license.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub feature: String,
    pub description: String,
    pub serial: String,
    pub issued: Option<DateTime<Utc>>,
    /// `None` for perpetual licenses.
    pub expires: Option<DateTime<Utc>>,
    pub expired: bool,
    pub authcode: String,
}

/// A certificate from the device certificate store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Certificate {
    pub name: String,
    pub common_name: String,
    pub subject: String,
    pub issuer: String,
    pub algorithm: String,
    pub not_valid_before: Option<DateTime<Utc>>,
    pub not_valid_after: Option<DateTime<Utc>>,
    pub is_ca: bool,
}

impl Certificate {
    /// True if the certificate expires before `now + window`.
    ///
    /// Certificates without a parseable expiry never match.
    pub fn expires_within(&self, window: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.not_valid_after.is_some_and(|after| after <= now + window)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.not_valid_after.is_some_and(|after| after <= now)
    }
}

/// One entry of the job queue (`show jobs all`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_type: String,
    /// Raw status token (`ACT`, `FIN`, `PEND`, ...).
    pub status: String,
    pub result: String,
    pub user: String,
    pub progress: u32,
    pub enqueued: Option<DateTime<Utc>>,
    pub finished: Option<DateTime<Utc>>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, day, 0, 0, 0)
            .single()
            .expect("valid date")
    }

    #[test]
    fn certificate_expiry_window() {
        let now = day(1, 1);
        let cert = Certificate {
            name: "web".into(),
            not_valid_after: Some(day(1, 20)),
            ..Default::default()
        };
        assert!(cert.expires_within(chrono::Duration::days(30), now));
        assert!(!cert.expires_within(chrono::Duration::days(7), now));
        assert!(!cert.is_expired(now));
        assert!(!Certificate::default().expires_within(chrono::Duration::days(365), now));
    }

    #[test]
    fn memory_percent_handles_zero_total() {
        assert!(ResourceUsage::default().memory_percent().abs() < f64::EPSILON);
        let usage = ResourceUsage {
            memory_total_kib: 200,
            memory_used_kib: 50,
            ..Default::default()
        };
        assert!((usage.memory_percent() - 25.0).abs() < f64::EPSILON);
    }
}
