//! Shared configuration for the panfly CLI.
//!
//! TOML profiles, API key resolution (env + plaintext), and translation to
//! `panfly_core::FirewallConfig`. The CLI layers its global flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use panfly_core::{DEFAULT_VSYS, FirewallConfig, PollConfig, TlsVerification};

/// Environment variable consulted when a profile names no key variable.
pub const API_KEY_ENV: &str = "PANFLY_API_KEY";

const ENV_PREFIX: &str = "PANFLY_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, or the default one when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::UnknownProfile { name })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named firewall or aggregator profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Management address ("fw01.example.net", "10.0.0.1:8443", or a URL).
    pub host: String,

    /// API key (plaintext, prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Managed-device serial to target by default (aggregators only).
    pub target: Option<String>,

    pub vsys: Option<String>,

    /// Path to custom CA certificate. Enables strict verification.
    pub ca_cert: Option<PathBuf>,

    /// Skip certificate verification even when `ca_cert` is set.
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Log-job poll interval in milliseconds.
    pub poll_interval_ms: Option<u64>,

    /// Log-job poll attempts before giving up.
    pub poll_attempts: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "panfly", "panfly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("panfly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// `PANFLY_`-prefixed variables override file values; nested keys use a
/// double underscore (`PANFLY_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an API key from the process environment and the profile.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(profile, profile_name, |name| std::env::var(name).ok())
}

/// Credential chain with an injectable environment lookup:
/// 1. the variable named by `api_key_env`
/// 2. `PANFLY_API_KEY`
/// 3. plaintext `api_key`
pub fn resolve_api_key_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let non_empty = |v: String| (!v.trim().is_empty()).then_some(v);

    if let Some(val) = profile.api_key_env.as_deref().and_then(&env).and_then(non_empty) {
        return Ok(SecretString::from(val));
    }
    if let Some(val) = env(API_KEY_ENV).and_then(non_empty) {
        return Ok(SecretString::from(val));
    }
    if let Some(key) = profile.api_key.clone().and_then(non_empty) {
        return Ok(SecretString::from(key));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// TLS mode for a profile: `insecure` wins, then a custom CA, else accept
/// the appliance's self-signed certificate.
pub fn tls_for(profile: &Profile, default_insecure: bool) -> TlsVerification {
    match &profile.ca_cert {
        Some(ca) if !profile.insecure.unwrap_or(default_insecure) => {
            TlsVerification::CustomCa(ca.clone())
        }
        _ => TlsVerification::DangerAcceptInvalid,
    }
}

/// Build a `FirewallConfig` from a profile and an already-resolved key.
pub fn profile_to_firewall_config(
    profile: &Profile,
    profile_name: &str,
    api_key: SecretString,
) -> Result<FirewallConfig, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: format!("profiles.{profile_name}.host"),
            reason: "must not be empty".into(),
        });
    }
    if profile.poll_attempts == Some(0) {
        return Err(ConfigError::Validation {
            field: format!("profiles.{profile_name}.poll_attempts"),
            reason: "must be at least 1".into(),
        });
    }

    let defaults = PollConfig::default();
    let poll = PollConfig {
        interval: profile
            .poll_interval_ms
            .map_or(defaults.interval, Duration::from_millis),
        max_attempts: profile.poll_attempts.unwrap_or(defaults.max_attempts),
    };

    Ok(FirewallConfig {
        host: host.to_owned(),
        api_key,
        tls: tls_for(profile, false),
        timeout: Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout)),
        target: profile.target.clone().filter(|t| !t.trim().is_empty()),
        vsys: profile.vsys.clone().unwrap_or_else(|| DEFAULT_VSYS.into()),
        poll,
        ..FirewallConfig::default()
    })
}
