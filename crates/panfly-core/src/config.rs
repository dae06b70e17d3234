// ── Runtime connection configuration ──
//
// Describes *how* to reach one appliance. Carries the API key and tuning
// knobs but never touches disk: the CLI builds a `FirewallConfig` from its
// profile and hands it in.

use std::time::Duration;

use panfly_api::{PollConfig, TlsMode, TransportConfig};
use panfly_api::transport::DEFAULT_MAX_BODY_BYTES;
use secrecy::SecretString;

/// Default virtual system for rulebase and hit-count lookups.
pub const DEFAULT_VSYS: &str = "vsys1";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Default, appliances ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single firewall or aggregator.
#[derive(Debug, Clone)]
pub struct FirewallConfig {
    /// Hostname, `host:port`, or full URL of the management interface.
    pub host: String,
    pub api_key: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Managed-device serial to route calls to (aggregators only).
    pub target: Option<String>,
    pub vsys: String,
    pub poll: PollConfig,
    pub max_body_bytes: usize,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.1".into(),
            api_key: SecretString::from(String::new()),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            target: None,
            vsys: DEFAULT_VSYS.into(),
            poll: PollConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl FirewallConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            max_body_bytes: self.max_body_bytes,
        }
    }
}
