// ── Domain records ──
//
// Flat value types produced by the schema-fallback parsers. Records have no
// identity beyond their fields and are rebuilt on every call.

pub mod device;
pub mod log;
pub mod network;
pub mod policy;
pub mod session;
pub mod system;

pub use device::ManagedDevice;
pub use log::{LogQuery, LogType, SystemLogEntry, ThreatLogEntry, TrafficLogEntry};
pub use network::{ArpEntry, Interface, IpsecTunnel, RouteEntry};
pub use policy::{HitCount, NatRule, RuleLayer, RulebaseKind, SecurityRule};
pub use session::{Session, SessionInfo};
pub use system::{Certificate, Environmental, Job, LicenseInfo, ResourceUsage, SystemInfo};
