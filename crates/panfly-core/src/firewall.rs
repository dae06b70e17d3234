// ── Firewall facade ──
//
// One async operation per domain object. Each takes the caller's
// cancellation token, issues one or more XML API calls and hands the payload
// to the schema-fallback parsers. Connectivity, authentication and protocol
// rejections propagate; "this firmware doesn't expose X" comes back empty.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use panfly_api::{Params, PollConfig, Route, XmlApiClient, poll_job};

use crate::config::{DEFAULT_VSYS, FirewallConfig};
use crate::error::CoreError;
use crate::filter::SessionFilter;
use crate::model::{
    ArpEntry, Certificate, Environmental, Interface, IpsecTunnel, Job, LicenseInfo, LogQuery,
    LogType, ManagedDevice, NatRule, ResourceUsage, RouteEntry, SecurityRule, Session,
    SessionInfo, SystemInfo, SystemLogEntry, ThreatLogEntry, TrafficLogEntry,
};
use crate::parse::{self, Record};
use crate::rulebase;

/// Log queries default to this many entries when no positive limit is given.
pub const DEFAULT_MAX_RESULTS: u32 = 100;
/// Upper bound the appliance accepts for `nlogs`.
pub const MAX_RESULTS_CAP: u32 = 5000;

const CMD_SYSTEM_INFO: &str = "<show><system><info></info></system></show>";
const CMD_RESOURCES: &str = "<show><system><resources></resources></system></show>";
const CMD_ENVIRONMENTALS: &str = "<show><system><environmentals></environmentals></system></show>";
const CMD_SESSION_INFO: &str = "<show><session><info></info></session></show>";
const CMD_INTERFACES: &str = "<show><interface>all</interface></show>";
const CMD_ROUTES: &str = "<show><routing><route></route></routing></show>";
const CMD_ADVANCED_ROUTES: &str = "<show><advanced-routing><route></route></advanced-routing></show>";
const CMD_VPN_FLOW: &str = "<show><vpn><flow></flow></vpn></show>";
const CMD_VPN_SA: &str = "<show><vpn><ipsec-sa></ipsec-sa></vpn></show>";
const CMD_ARP: &str = "<show><arp><entry name = 'all'/></arp></show>";
const CMD_LICENSES: &str = "<request><license><info></info></license></request>";
const CMD_JOBS: &str = "<show><jobs><all></all></jobs></show>";
const CMD_DEVICES: &str = "<show><devices><all></all></devices></show>";

/// Clamp a caller-supplied log limit into `1..=MAX_RESULTS_CAP`.
pub fn effective_max_results(requested: i64) -> u32 {
    if requested <= 0 {
        return DEFAULT_MAX_RESULTS;
    }
    u32::try_from(requested).map_or(MAX_RESULTS_CAP, |n| n.min(MAX_RESULTS_CAP))
}

// ── Firewall ─────────────────────────────────────────────────────

/// Read-only view of one firewall or aggregator.
///
/// Cheaply cloneable via `Arc`. Clones share the client, so a target set on
/// one clone is seen by all of them.
#[derive(Clone)]
pub struct Firewall {
    inner: Arc<FirewallInner>,
}

struct FirewallInner {
    client: XmlApiClient,
    vsys: String,
    poll: PollConfig,
}

impl Firewall {
    /// Build the HTTP client for `config` and apply its default target.
    pub fn connect(config: &FirewallConfig) -> Result<Self, CoreError> {
        let client = XmlApiClient::new(&config.host, &config.api_key, &config.transport())?;
        if let Some(serial) = &config.target {
            client.set_target(serial.as_str());
        }
        debug!(endpoint = %client.endpoint(), "firewall client ready");
        Ok(Self::from_parts(client, config.vsys.clone(), config.poll))
    }

    /// Wrap an existing client with default vsys and poll settings.
    pub fn with_client(client: XmlApiClient) -> Self {
        Self::from_parts(client, DEFAULT_VSYS.to_owned(), PollConfig::default())
    }

    pub fn from_parts(client: XmlApiClient, vsys: String, poll: PollConfig) -> Self {
        Self {
            inner: Arc::new(FirewallInner { client, vsys, poll }),
        }
    }

    pub fn client(&self) -> &XmlApiClient {
        &self.inner.client
    }

    pub fn vsys(&self) -> &str {
        &self.inner.vsys
    }

    // ── Target routing ───────────────────────────────────────────

    pub fn set_target(&self, serial: &str) {
        self.inner.client.set_target(serial);
    }

    pub fn clear_target(&self) {
        self.inner.client.clear_target();
    }

    pub fn target(&self) -> Option<String> {
        self.inner.client.target()
    }

    pub fn has_target(&self) -> bool {
        self.inner.client.has_target()
    }

    // ── Internal helpers ─────────────────────────────────────────

    async fn op(&self, cmd: &str, cancel: &CancellationToken) -> Result<String, CoreError> {
        let env = self.inner.client.query(&Params::op(cmd), cancel).await?;
        Ok(env.payload)
    }

    /// Secondary-source lookup: protocol and decode failures read as empty.
    async fn op_or_empty(&self, cmd: &str, cancel: &CancellationToken) -> Result<String, CoreError> {
        match self.inner.client.query(&Params::op(cmd), cancel).await {
            Ok(env) => Ok(env.payload),
            Err(e) if e.is_fatal_for_fallback() => Err(e.into()),
            Err(e) => {
                debug!(cmd, error = %e, "fallback source unavailable");
                Ok(String::new())
            }
        }
    }

    async fn query_logs<T: Record + Send>(
        &self,
        log_type: LogType,
        query: Option<&str>,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> Result<LogQuery<T>, CoreError> {
        let nlogs = effective_max_results(max_results);
        let params = Params::log_query(&log_type.to_string(), nlogs, query);
        let handle = self.inner.client.submit_job(&params, cancel).await?;
        let result = poll_job(&self.inner.client, &handle, self.inner.poll, cancel).await?;
        let entries = parse::log::log_entries(&result.payload);
        debug!(
            %log_type,
            job_id = %result.job_id,
            state = ?result.state,
            count = entries.len(),
            "log query complete"
        );
        Ok(LogQuery {
            job_id: result.job_id,
            state: result.state,
            entries,
        })
    }

    // ── System ───────────────────────────────────────────────────

    pub async fn system_info(&self, cancel: &CancellationToken) -> Result<SystemInfo, CoreError> {
        let payload = self.op(CMD_SYSTEM_INFO, cancel).await?;
        Ok(parse::system::system_info(&payload).unwrap_or_default())
    }

    pub async fn resources(&self, cancel: &CancellationToken) -> Result<ResourceUsage, CoreError> {
        let payload = self.op(CMD_RESOURCES, cancel).await?;
        Ok(parse::system::resources(&payload))
    }

    pub async fn environmentals(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Environmental>, CoreError> {
        let payload = self.op(CMD_ENVIRONMENTALS, cancel).await?;
        Ok(parse::system::environmentals(&payload))
    }

    pub async fn licenses(&self, cancel: &CancellationToken) -> Result<Vec<LicenseInfo>, CoreError> {
        let payload = self.op(CMD_LICENSES, cancel).await?;
        Ok(parse::system::licenses(&payload))
    }

    /// Certificates from the shared store, falling back to the vsys store.
    pub async fn certificates(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Certificate>, CoreError> {
        let vsys = &self.inner.vsys;
        let xpaths = [
            "/config/shared/certificate".to_owned(),
            format!(
                "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='{vsys}']/certificate"
            ),
        ];
        rulebase::first_config_hit(
            &self.inner.client,
            &xpaths,
            parse::system::certificates,
            cancel,
        )
        .await
    }

    pub async fn jobs(&self, cancel: &CancellationToken) -> Result<Vec<Job>, CoreError> {
        let payload = self.op(CMD_JOBS, cancel).await?;
        Ok(parse::system::jobs(&payload))
    }

    // ── Sessions ─────────────────────────────────────────────────

    pub async fn sessions(
        &self,
        filter: &SessionFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Session>, CoreError> {
        let payload = self.op(&filter.command(), cancel).await?;
        Ok(parse::session::sessions(&payload))
    }

    pub async fn session_info(&self, cancel: &CancellationToken) -> Result<SessionInfo, CoreError> {
        let payload = self.op(CMD_SESSION_INFO, cancel).await?;
        Ok(parse::session::session_info(&payload).unwrap_or_default())
    }

    // ── Policy ───────────────────────────────────────────────────

    /// Security rules in evaluation order with hit statistics.
    pub async fn security_rules(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<SecurityRule>, CoreError> {
        rulebase::aggregate(&self.inner.client, &self.inner.vsys, cancel).await
    }

    /// NAT rules in evaluation order with hit statistics.
    pub async fn nat_rules(&self, cancel: &CancellationToken) -> Result<Vec<NatRule>, CoreError> {
        rulebase::aggregate(&self.inner.client, &self.inner.vsys, cancel).await
    }

    // ── Network ──────────────────────────────────────────────────

    pub async fn interfaces(&self, cancel: &CancellationToken) -> Result<Vec<Interface>, CoreError> {
        let payload = self.op(CMD_INTERFACES, cancel).await?;
        Ok(parse::network::interfaces(&payload))
    }

    /// Legacy routing table, or the advanced-routing engine's when the
    /// legacy one is empty.
    pub async fn routes(&self, cancel: &CancellationToken) -> Result<Vec<RouteEntry>, CoreError> {
        let payload = self.op_or_empty(CMD_ROUTES, cancel).await?;
        let routes = parse::network::routes(&payload);
        if !routes.is_empty() {
            return Ok(routes);
        }
        let payload = self.op_or_empty(CMD_ADVANCED_ROUTES, cancel).await?;
        Ok(parse::network::routes(&payload))
    }

    /// Tunnels from the flow table, or the IPsec SA list when that is empty.
    pub async fn vpn_tunnels(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<IpsecTunnel>, CoreError> {
        let payload = self.op(CMD_VPN_FLOW, cancel).await?;
        let tunnels = parse::network::vpn_tunnels(&payload);
        if !tunnels.is_empty() {
            return Ok(tunnels);
        }
        let payload = self.op_or_empty(CMD_VPN_SA, cancel).await?;
        Ok(parse::network::vpn_tunnels(&payload))
    }

    pub async fn arp_table(&self, cancel: &CancellationToken) -> Result<Vec<ArpEntry>, CoreError> {
        let payload = self.op(CMD_ARP, cancel).await?;
        Ok(parse::network::arp_table(&payload))
    }

    // ── Aggregator ───────────────────────────────────────────────

    /// Devices managed by the aggregator.
    ///
    /// Always addressed to the aggregator itself; the current target is
    /// neither used nor modified.
    pub async fn managed_devices(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ManagedDevice>, CoreError> {
        let env = self
            .inner
            .client
            .query_routed(&Params::op(CMD_DEVICES), &Route::Aggregator, cancel)
            .await?;
        Ok(parse::device::managed_devices(&env.payload))
    }

    // ── Logs ─────────────────────────────────────────────────────

    pub async fn traffic_logs(
        &self,
        query: Option<&str>,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<TrafficLogEntry>, CoreError> {
        Ok(self.traffic_logs_detailed(query, max_results, cancel).await?.entries)
    }

    pub async fn threat_logs(
        &self,
        query: Option<&str>,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<ThreatLogEntry>, CoreError> {
        Ok(self.threat_logs_detailed(query, max_results, cancel).await?.entries)
    }

    pub async fn system_logs(
        &self,
        query: Option<&str>,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<SystemLogEntry>, CoreError> {
        Ok(self.system_logs_detailed(query, max_results, cancel).await?.entries)
    }

    /// Traffic log query with the job outcome, so callers can tell a
    /// timed-out search from an empty one.
    pub async fn traffic_logs_detailed(
        &self,
        query: Option<&str>,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> Result<LogQuery<TrafficLogEntry>, CoreError> {
        self.query_logs(LogType::Traffic, query, max_results, cancel).await
    }

    pub async fn threat_logs_detailed(
        &self,
        query: Option<&str>,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> Result<LogQuery<ThreatLogEntry>, CoreError> {
        self.query_logs(LogType::Threat, query, max_results, cancel).await
    }

    pub async fn system_logs_detailed(
        &self,
        query: Option<&str>,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> Result<LogQuery<SystemLogEntry>, CoreError> {
        self.query_logs(LogType::System, query, max_results, cancel).await
    }
}
