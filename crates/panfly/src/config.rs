//! Bridges the TOML profile store and global flags into a `FirewallConfig`.
//!
//! Precedence per field: flag (or its env var) > profile > built-in default.

use secrecy::SecretString;
use tracing::{debug, warn};

use panfly_config::{Config, ConfigError, Profile};
use panfly_core::FirewallConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// A connection config together with the profile it came from.
pub struct Resolved {
    pub profile_name: String,
    pub firewall: FirewallConfig,
}

/// Load the config file, falling back to defaults when it is unreadable.
pub fn load_config_or_default() -> Config {
    panfly_config::load_config().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    })
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Overlay global flags on a profile.
pub fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(host) = &global.host {
        profile.host.clone_from(host);
    }
    if let Some(target) = &global.target {
        profile.target = Some(target.clone());
    }
    if let Some(vsys) = &global.vsys {
        profile.vsys = Some(vsys.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
}

/// Build the connection config for this invocation.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None if global.host.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: panfly_config::config_path().display().to_string(),
            });
        }
    };
    if profile.insecure.is_none() && cfg.defaults.insecure {
        profile.insecure = Some(true);
    }
    if profile.timeout.is_none() {
        profile.timeout = Some(cfg.defaults.timeout);
    }
    apply_overrides(&mut profile, global);

    let api_key = match &global.api_key {
        Some(key) => SecretString::from(key.clone()),
        None => panfly_config::resolve_api_key(&profile, &profile_name).map_err(|e| match e {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            other => CliError::Config(other),
        })?,
    };

    let firewall = panfly_config::profile_to_firewall_config(&profile, &profile_name, api_key)?;
    debug!(profile = %profile_name, host = %firewall.host, target = ?firewall.target, "resolved connection");

    Ok(Resolved {
        profile_name,
        firewall,
    })
}
