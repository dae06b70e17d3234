// ── Core error types ──
//
// User-facing errors from panfly-core. Consumers never see HTTP status codes
// or envelope internals directly; the `From<panfly_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to firewall at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to firewall timed out: {reason}")]
    Timeout { reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Request rejected by firewall: {message}")]
    Rejected {
        message: String,
        /// Envelope `code` attribute, if the appliance sent one.
        code: Option<String>,
    },

    #[error("Malformed response from firewall: {message}")]
    Decode { message: String },

    #[error("Log query was not accepted: {message}")]
    JobSubmission { message: String },

    // ── Caller errors ────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Entity not found: {entity_type} '{identifier}'")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<panfly_api::Error> for CoreError {
    fn from(err: panfly_api::Error) -> Self {
        match err {
            panfly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            panfly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                }
            }
            panfly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            panfly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            panfly_api::Error::Cancelled => CoreError::Cancelled,
            panfly_api::Error::Api { code, message, .. } => CoreError::Rejected { message, code },
            panfly_api::Error::JobSubmission { message } => CoreError::JobSubmission { message },
            panfly_api::Error::InvalidParameter { name, reason } => CoreError::ValidationFailed {
                message: format!("parameter '{name}': {reason}"),
            },
            panfly_api::Error::Envelope { message, body: _ } => CoreError::Decode { message },
        }
    }
}
