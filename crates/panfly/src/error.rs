//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use panfly_config::ConfigError;
use panfly_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// Conventional shell code for SIGINT.
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to firewall at {url}")]
    #[diagnostic(
        code(panfly::connection_failed),
        help(
            "Check that the management interface is reachable.\n\
             URL: {url}\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(panfly::timeout),
        help("Increase the timeout with --timeout or check appliance load.\n{reason}")
    )]
    Timeout { reason: String },

    #[error("Interrupted")]
    #[diagnostic(code(panfly::interrupted))]
    Cancelled,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(panfly::auth_failed),
        help(
            "Verify the API key for profile '{profile}'.\n\
             Keys are generated with type=keygen on the appliance."
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(panfly::no_credentials),
        help(
            "Set api_key_env in the profile, export PANFLY_API_KEY,\n\
             or pass --api-key."
        )
    )]
    NoCredentials { profile: String },

    // ── Appliance ────────────────────────────────────────────────────
    #[error("Firewall rejected the request: {message}")]
    #[diagnostic(code(panfly::rejected), help("Appliance error code: {error_code}"))]
    Rejected { message: String, error_code: String },

    #[error("Unreadable response: {message}")]
    #[diagnostic(
        code(panfly::decode),
        help("The management interface answered with something other than an API envelope.")
    )]
    Decode { message: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(panfly::not_found),
        help("Run: panfly {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(panfly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(panfly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: panfly config init --name {name} --address <host>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No firewall configured")]
    #[diagnostic(
        code(panfly::no_config),
        help(
            "Create a profile with: panfly config init --address <host>\n\
             or pass --host and --api-key. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(panfly::config))]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(code(panfly::internal))]
    Internal(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Cancelled => exit_code::INTERRUPTED,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to authentication failures.
    #[must_use]
    pub fn with_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.to_owned(),
                message,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { reason } => Self::Timeout { reason },
            CoreError::Cancelled => Self::Cancelled,
            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::Rejected { message, code } => Self::Rejected {
                message,
                error_code: code.unwrap_or_else(|| "-".into()),
            },
            CoreError::JobSubmission { message } => Self::Rejected {
                message: format!("log query not accepted: {message}"),
                error_code: "-".into(),
            },
            CoreError::Decode { message } => Self::Decode { message },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "https://fw01/api/".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::AuthenticationFailed {
                    message: "Invalid Credential".into(),
                },
                exit_code::AUTH,
            ),
            (CoreError::Cancelled, exit_code::INTERRUPTED),
            (
                CoreError::ValidationFailed {
                    message: "unknown filter key".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Rejected {
                    message: "bad xpath".into(),
                    code: Some("17".into()),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, want) in cases {
            let cli = CliError::from(core);
            assert_eq!(cli.exit_code(), want, "{cli:?}");
        }
    }

    #[test]
    fn profile_is_attached_to_auth_failures() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "denied".into(),
        })
        .with_profile("branch");
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "branch"));
    }
}
