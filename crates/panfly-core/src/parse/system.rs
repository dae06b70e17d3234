// Appliance-level parsers: system info, resources, environmentals,
// licenses, certificates and the job queue.

use roxmltree::Node;

use panfly_api::PAYLOAD_ROOT;

use super::time::parse_uptime;
use super::xml::Fields;
use super::{Record, Strategy, extract, payload_text};
use crate::model::{Certificate, Environmental, Job, LicenseInfo, ResourceUsage, SystemInfo};

// ── System info ─────────────────────────────────────────────────────

const SYSTEM_INFO: &[Strategy<SystemInfo>] = &[
    Strategy::path("system", &["system"]),
    Strategy::path("wrapped system", &["*", "system"]),
    Strategy::path("bare fields", &[]),
];

impl Record for SystemInfo {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        let uptime = f.text(&["uptime"]);
        Self {
            hostname: f.text(&["hostname", "devicename"]),
            ip_address: f.text(&["ip-address", "mgmt-ip"]),
            netmask: f.text(&["netmask"]),
            default_gateway: f.text(&["default-gateway"]),
            mac_address: f.text(&["mac-address"]),
            model: f.text(&["model"]),
            serial: f.text(&["serial", "serial-number"]),
            family: f.text(&["family"]),
            sw_version: f.text(&["sw-version", "sw_version"]),
            app_version: f.text(&["app-version"]),
            threat_version: f.text(&["threat-version"]),
            antivirus_version: f.text(&["av-version", "antivirus-version"]),
            wildfire_version: f.text(&["wildfire-version"]),
            url_filtering_version: f.text(&["url-filtering-version", "url-db"]),
            uptime_secs: parse_uptime(&uptime),
            uptime,
            multi_vsys: f.flag(&["multi-vsys"]),
            operational_mode: f.text(&["operational-mode"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.hostname.is_empty() || !self.serial.is_empty()
    }
}

pub(crate) fn system_info(payload: &str) -> Option<SystemInfo> {
    extract(payload, SYSTEM_INFO).into_iter().next()
}

// ── Resources ───────────────────────────────────────────────────────

/// Scrape `top`-style text (either the procps-3 or procps-ng layout).
pub(crate) fn resources(payload: &str) -> ResourceUsage {
    let text = payload_text(payload);
    let mut usage = ResourceUsage::default();

    for line in text.lines().map(str::trim) {
        if let Some(idx) = line.find("load average:") {
            let loads: Vec<f64> = line
                .get(idx + "load average:".len()..)
                .unwrap_or_default()
                .split(',')
                .filter_map(|v| v.trim().parse().ok())
                .collect();
            if let [one, five, fifteen, ..] = loads.as_slice() {
                usage.load_1 = *one;
                usage.load_5 = *five;
                usage.load_15 = *fifteen;
            }
        } else if let Some(rest) = line.strip_prefix("Tasks:") {
            usage.tasks_total = labeled(rest)
                .iter()
                .find(|(_, label)| label == "total")
                .map_or(0, |(v, _)| to_u64(*v));
        } else if line.contains("Cpu(s)") {
            let rest = line.split_once(':').map_or("", |(_, r)| r);
            if let Some((idle, _)) = labeled(rest).into_iter().find(|(_, l)| l == "id") {
                usage.cpu_percent = (100.0 - idle).max(0.0);
            }
        } else if let Some((scale, rest)) = memory_line(line, "Mem") {
            for (value, label) in labeled(rest) {
                let kib = to_u64(value * scale);
                match label.as_str() {
                    "total" => usage.memory_total_kib = kib,
                    "used" => usage.memory_used_kib = kib,
                    "free" => usage.memory_free_kib = kib,
                    _ => {}
                }
            }
        } else if let Some((scale, rest)) = memory_line(line, "Swap") {
            for (value, label) in labeled(rest) {
                let kib = to_u64(value * scale);
                match label.as_str() {
                    "total" => usage.swap_total_kib = kib,
                    "used" => usage.swap_used_kib = kib,
                    _ => {}
                }
            }
        }
    }
    usage
}

/// `MiB Mem : ...`, `KiB Swap: ...` or `Mem: ...` with its KiB scale factor.
fn memory_line<'a>(line: &'a str, what: &str) -> Option<(f64, &'a str)> {
    let (head, rest) = line.split_once(':')?;
    let mut words = head.split_whitespace();
    let (unit, name) = match (words.next(), words.next()) {
        (Some(name), None) => ("KiB", name),
        (Some(unit), Some(name)) => (unit, name),
        _ => return None,
    };
    if name != what {
        return None;
    }
    let scale = match unit {
        "MiB" => 1024.0,
        "GiB" => 1024.0 * 1024.0,
        _ => 1.0,
    };
    Some((scale, rest))
}

/// `"16000.0 total,  2000.0 free"` or `"3.2%us, 1.0%sy"` into value/label pairs.
fn labeled(rest: &str) -> Vec<(f64, String)> {
    rest.split(',')
        .filter_map(|piece| {
            let piece = piece.trim();
            let (number, label) = match piece.split_once('%') {
                Some((n, l)) => (n.trim(), l.trim()),
                None => {
                    let mut words = piece.split_whitespace();
                    (words.next()?, words.next().unwrap_or_default())
                }
            };
            let value = number.trim_end_matches(['k', 'K']).parse::<f64>().ok()?;
            let label = label.trim_end_matches('.').to_owned();
            Some((value, label))
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn to_u64(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

// ── Environmentals ──────────────────────────────────────────────────

const ENVIRONMENTALS: &[Strategy<Environmental>] = &[
    Strategy::path("category/slot/entry", &["*", "*", "entry"]),
    Strategy::path("category/entry", &["*", "entry"]),
    Strategy::path("wrapped category/slot/entry", &["*", "*", "*", "entry"]),
];

const READINGS: &[(&str, &str)] = &[("DegreesC", "C"), ("RPMs", "RPM"), ("Volts", "V")];

impl Record for Environmental {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        let (value, unit) = READINGS
            .iter()
            .find_map(|(field, unit)| {
                f.opt(&[*field])
                    .and_then(|v| v.parse::<f64>().ok())
                    .map(|v| (v, (*unit).to_owned()))
            })
            .unwrap_or_default();
        Self {
            category: category_of(node),
            slot: f.text(&["slot"]),
            description: f.text(&["description"]),
            value,
            unit,
            min: f.float(&["min"]),
            max: f.float(&["max"]),
            alarm: f.flag(&["alarm"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.description.is_empty()
    }
}

/// Name of the top-level element an entry sits under (`thermal`, `fan`, ...).
fn category_of(node: Node<'_, '_>) -> String {
    node.ancestors()
        .filter(Node::is_element)
        .find(|n| {
            n.parent_element()
                .is_some_and(|p| p.tag_name().name() == PAYLOAD_ROOT)
        })
        .map(|n| n.tag_name().name().to_owned())
        .unwrap_or_default()
}

pub(crate) fn environmentals(payload: &str) -> Vec<Environmental> {
    extract(payload, ENVIRONMENTALS)
}

// ── Licenses ────────────────────────────────────────────────────────

const LICENSES: &[Strategy<LicenseInfo>] = &[
    Strategy::path("licenses", &["licenses", "entry"]),
    Strategy::path("wrapped licenses", &["*", "licenses", "entry"]),
    Strategy::path("entries", &["entry"]),
];

impl Record for LicenseInfo {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            feature: f.text(&["feature", "name"]),
            description: f.text(&["description"]),
            serial: f.text(&["serial"]),
            issued: f.time(&["issued"]),
            expires: f.time(&["expires"]),
            expired: f.flag(&["expired"]),
            authcode: f.text(&["authcode"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.feature.is_empty()
    }
}

pub(crate) fn licenses(payload: &str) -> Vec<LicenseInfo> {
    extract(payload, LICENSES)
}

// ── Certificates ────────────────────────────────────────────────────

const CERTIFICATES: &[Strategy<Certificate>] = &[
    Strategy::path("certificate", &["certificate", "entry"]),
    Strategy::path("wrapped certificate", &["*", "certificate", "entry"]),
    Strategy::path("entries", &["entry"]),
];

impl Record for Certificate {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            name: f.text(&["name"]),
            common_name: f.text(&["common-name"]),
            subject: f.text(&["subject"]),
            issuer: f.text(&["issuer"]),
            algorithm: f.text(&["algorithm"]),
            not_valid_before: f.time(&["not-valid-before"]),
            not_valid_after: f.time(&["expiry-epoch", "not-valid-after"]),
            is_ca: f.flag(&["ca"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

pub(crate) fn certificates(payload: &str) -> Vec<Certificate> {
    extract(payload, CERTIFICATES)
}

// ── Jobs ────────────────────────────────────────────────────────────

const JOBS: &[Strategy<Job>] = &[
    Strategy::path("job", &["job"]),
    Strategy::path("wrapped job", &["*", "job"]),
];

impl Record for Job {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            id: f.text(&["id"]),
            job_type: f.text(&["type"]),
            status: f.text(&["status"]),
            result: f.text(&["result"]),
            user: f.text(&["user"]),
            progress: f.u32(&["progress"]),
            enqueued: f.time(&["tenq"]),
            finished: f.time(&["tfin"]),
            description: f.text(&["description"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }
}

pub(crate) fn jobs(payload: &str) -> Vec<Job> {
    extract(payload, JOBS)
}
