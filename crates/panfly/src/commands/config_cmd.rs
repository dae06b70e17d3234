//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use panfly_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// A profile as shown to the user: secrets never leave the config file.
#[derive(Debug, Clone, Serialize, Tabled)]
struct ProfileView {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Default")]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    default: bool,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "API Key")]
    api_key: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Vsys")]
    vsys: String,
    #[tabled(rename = "TLS")]
    tls: String,
}

impl ProfileView {
    fn new(name: &str, profile: &Profile, default: bool) -> Self {
        let api_key = match (&profile.api_key_env, &profile.api_key) {
            (Some(var), _) => format!("env:{var}"),
            (None, Some(_)) => "<stored>".into(),
            (None, None) => "-".into(),
        };
        let tls = match (profile.insecure, &profile.ca_cert) {
            (Some(true), _) => "insecure".into(),
            (_, Some(ca)) => format!("ca:{}", ca.display()),
            _ => "self-signed ok".into(),
        };
        Self {
            name: name.to_owned(),
            default,
            host: profile.host.clone(),
            api_key,
            target: profile.target.clone().unwrap_or_else(|| "-".into()),
            vsys: profile.vsys.clone().unwrap_or_else(|| "-".into()),
            tls,
        }
    }
}

fn views(cfg: &Config) -> Vec<ProfileView> {
    let mut names: Vec<&String> = cfg.profiles.keys().collect();
    names.sort();
    names
        .into_iter()
        .filter_map(|name| {
            let profile = cfg.profiles.get(name)?;
            let default = cfg.default_profile.as_deref() == Some(name.as_str());
            Some(ProfileView::new(name, profile, default))
        })
        .collect()
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            name,
            address,
            api_key_env,
            store_api_key,
            default_target,
            set_default,
        } => {
            if address.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "address".into(),
                    reason: "must not be empty".into(),
                });
            }
            let mut cfg = config::load_config_or_default();
            let first = cfg.profiles.is_empty();
            cfg.profiles.insert(
                name.clone(),
                Profile {
                    host: address,
                    api_key: store_api_key,
                    api_key_env,
                    target: default_target,
                    vsys: global.vsys.clone(),
                    insecure: global.insecure.then_some(true),
                    timeout: global.timeout,
                    ..Profile::default()
                },
            );
            if set_default || first {
                cfg.default_profile = Some(name.clone());
            }
            let path = panfly_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Saved profile '{name}' to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_list(
                global.output,
                &views(&cfg),
                ProfileView::clone,
                |v| v.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &panfly_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let names: Vec<String> = views(&cfg).into_iter().map(|v| v.name).collect();
            output::print_output(&names.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                let available: Vec<String> = views(&cfg).into_iter().map(|v| v.name).collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available.join(", "),
                });
            }
            cfg.default_profile = Some(name.clone());
            panfly_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile is now '{name}'");
            }
            Ok(())
        }
    }
}
