// ── Policy records ──
//
// Security and NAT rules share the aggregation pipeline in `rulebase`:
// position and layer are assigned there, hit statistics joined afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Evaluation tier a rule was fetched from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RuleLayer {
    Pre,
    #[default]
    Local,
    Post,
}

impl RuleLayer {
    /// Evaluation order.
    pub const ALL: [RuleLayer; 3] = [RuleLayer::Pre, RuleLayer::Local, RuleLayer::Post];
}

/// Which rule base to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RulebaseKind {
    Security,
    Nat,
}

/// Hit statistics for one rule name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitCount {
    pub name: String,
    pub count: i64,
    pub first_hit: Option<DateTime<Utc>>,
    pub last_hit: Option<DateTime<Utc>>,
    pub last_reset: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SecurityRule {
    /// 1-based position across pre, local and post layers.
    pub position: usize,
    pub layer: RuleLayer,
    pub name: String,
    pub uuid: String,
    pub action: String,
    pub from_zones: Vec<String>,
    pub to_zones: Vec<String>,
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
    pub source_users: Vec<String>,
    pub applications: Vec<String>,
    pub services: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub profile_group: String,
    pub description: String,
    pub disabled: bool,
    pub log_start: bool,
    pub log_end: bool,
    pub hit_count: i64,
    pub first_hit: Option<DateTime<Utc>>,
    pub last_hit: Option<DateTime<Utc>>,
    pub last_reset: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NatRule {
    pub position: usize,
    pub layer: RuleLayer,
    pub name: String,
    pub uuid: String,
    pub nat_type: String,
    pub from_zones: Vec<String>,
    pub to_zones: Vec<String>,
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
    pub service: String,
    pub to_interface: String,
    /// Source translation summary, e.g. `dynamic-ip-and-port ethernet1/1`.
    pub source_translation: String,
    /// Destination translation summary, e.g. `10.0.0.5:8443`.
    pub destination_translation: String,
    pub tags: Vec<String>,
    pub description: String,
    pub disabled: bool,
    pub hit_count: i64,
    pub first_hit: Option<DateTime<Utc>>,
    pub last_hit: Option<DateTime<Utc>>,
    pub last_reset: Option<DateTime<Utc>>,
}
