// Request parameters and per-call routing.
//
// Every call is a flat key/value set. Builders below cover the request
// families the client issues: operational commands, configuration reads,
// log-query submission and log-job retrieval.

use std::collections::BTreeMap;
use std::fmt;

use crate::auth::FORBIDDEN_PARAMS;
use crate::error::Error;

/// Parameter name used to route a call to a managed device.
pub const TARGET_PARAM: &str = "target";

/// Immutable-per-call request parameter set.
///
/// Keys are protocol-mandated (`type`, `action`, `xpath`, `cmd`, `log-type`,
/// `nlogs`, `query`, `job-id`, `target`); values are opaque strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: BTreeMap<String, String>,
}

/// Verb for configuration reads.
///
/// `Show` returns the active (running) configuration, `Get` the candidate.
/// Some device families only answer one of the two for a given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Show,
    Get,
}

impl ConfigAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Get => "get",
        }
    }
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a parameter.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pairs.insert(key.to_owned(), value.into());
        self
    }

    /// `type=op` with an XML command document.
    pub fn op(cmd: impl Into<String>) -> Self {
        Self::new().with("type", "op").with("cmd", cmd)
    }

    /// `type=config` read at an xpath.
    pub fn config(action: ConfigAction, xpath: impl Into<String>) -> Self {
        Self::new()
            .with("type", "config")
            .with("action", action.as_str())
            .with("xpath", xpath)
    }

    /// `type=log` query submission. An empty query is omitted entirely.
    pub fn log_query(log_type: &str, nlogs: u32, query: Option<&str>) -> Self {
        let params = Self::new()
            .with("type", "log")
            .with("log-type", log_type)
            .with("nlogs", nlogs.to_string());
        match query.map(str::trim) {
            Some(q) if !q.is_empty() => params.with("query", q),
            _ => params,
        }
    }

    /// `type=log&action=get` status/result retrieval for a submitted job.
    pub fn log_job(job_id: &str) -> Self {
        Self::new()
            .with("type", "log")
            .with("action", "get")
            .with("job-id", job_id)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reject parameters that would put credentials into the request body.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        for name in FORBIDDEN_PARAMS {
            if self.pairs.contains_key(*name) {
                return Err(Error::InvalidParameter {
                    name: (*name).to_owned(),
                    reason: "credentials travel in the X-PAN-KEY header only".into(),
                });
            }
        }
        Ok(())
    }

    /// Copy of these parameters with the routing target applied.
    ///
    /// A caller-supplied `target` is always replaced by the resolved route so
    /// the route is the single source of truth for device addressing.
    pub(crate) fn routed(&self, target: Option<&str>) -> Self {
        let mut out = self.clone();
        out.pairs.remove(TARGET_PARAM);
        if let Some(serial) = target {
            out.pairs.insert(TARGET_PARAM.to_owned(), serial.to_owned());
        }
        out
    }
}

impl fmt::Display for Params {
    /// Log-friendly rendering. Never contains secrets (see [`Params::validate`]).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.pairs {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// Where a single call is delivered when talking to an aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    /// Use the client's current target, if any.
    #[default]
    Current,
    /// Address the aggregator itself, ignoring the current target.
    Aggregator,
    /// Address one managed device by serial, ignoring the current target.
    Device(String),
}

impl Route {
    /// Resolve to the serial to inject, given the client's current target.
    pub(crate) fn resolve(&self, current: Option<&str>) -> Option<String> {
        match self {
            Self::Current => current.map(str::to_owned),
            Self::Aggregator => None,
            Self::Device(serial) => {
                let serial = serial.trim();
                (!serial.is_empty()).then(|| serial.to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_query_omits_blank_query() {
        let p = Params::log_query("traffic", 100, Some("   "));
        assert_eq!(p.get("nlogs"), Some("100"));
        assert!(!p.contains("query"));
    }

    #[test]
    fn routed_replaces_caller_target() {
        let p = Params::op("<show/>").with(TARGET_PARAM, "stale");
        assert_eq!(p.routed(Some("001")).get(TARGET_PARAM), Some("001"));
        assert!(!p.routed(None).contains(TARGET_PARAM));
    }

    #[test]
    fn key_parameter_is_rejected() {
        let p = Params::op("<show/>").with("key", "secret");
        assert!(matches!(p.validate(), Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn route_resolution() {
        assert_eq!(Route::Current.resolve(Some("A")), Some("A".into()));
        assert_eq!(Route::Aggregator.resolve(Some("A")), None);
        assert_eq!(Route::Device("B".into()).resolve(Some("A")), Some("B".into()));
        assert_eq!(Route::Device(String::new()).resolve(Some("A")), None);
    }

    #[test]
    fn device_route_trims_serial_like_set_target() {
        assert_eq!(Route::Device("  ".into()).resolve(Some("A")), None);
        assert_eq!(Route::Device(" 0079 ".into()).resolve(None), Some("0079".into()));
    }
}
