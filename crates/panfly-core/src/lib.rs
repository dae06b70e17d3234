// panfly-core: domain layer between panfly-api and consumers (CLI).
//
// Schema-fallback parsing, rulebase aggregation and the per-domain
// `Firewall` operations live here.

pub mod config;
pub mod error;
pub mod filter;
pub mod firewall;
pub mod fleet;
pub mod model;
mod parse;
mod rulebase;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_VSYS, FirewallConfig, TlsVerification};
pub use error::CoreError;
pub use filter::SessionFilter;
pub use firewall::{DEFAULT_MAX_RESULTS, Firewall, MAX_RESULTS_CAP, effective_max_results};
pub use fleet::Fleet;

// Re-export API types consumers commonly need alongside core.
pub use panfly_api::{JobState, PollConfig};

pub use model::{
    ArpEntry, Certificate, Environmental, HitCount, Interface, IpsecTunnel, Job, LicenseInfo,
    LogQuery, LogType, ManagedDevice, NatRule, ResourceUsage, RouteEntry, RuleLayer, RulebaseKind,
    SecurityRule, Session, SessionInfo, SystemInfo, SystemLogEntry, ThreatLogEntry,
    TrafficLogEntry,
};
