use thiserror::Error;

/// Top-level error type for the `panfly-api` crate.
///
/// Three families matter to callers: transport failures (the request never
/// produced a usable response), protocol failures (the appliance answered
/// with a non-success envelope), and decode failures of the outer envelope.
/// Inner-payload decoding never produces an error here -- that is handled
/// best-effort by `panfly-core`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The appliance rejected the API key (HTTP 401/403 or envelope code 403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The caller's cancellation token fired before the call completed.
    #[error("Request cancelled")]
    Cancelled,

    // ── Protocol ────────────────────────────────────────────────────
    /// The envelope reported a non-success status.
    #[error("API error (status={status}, code={}): {message}", code.as_deref().unwrap_or("-"))]
    Api {
        status: String,
        code: Option<String>,
        message: String,
    },

    /// A log query was accepted but the response carried no job identifier.
    #[error("Job submission returned no job id: {message}")]
    JobSubmission { message: String },

    /// A request parameter the transport refuses to send.
    #[error("Invalid request parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The outer `<response>` envelope was not well-formed, with the raw
    /// body kept for debugging.
    #[error("Malformed response envelope: {message}")]
    Envelope { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-keying or fixing credentials might resolve this.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` for failures that say nothing about whether a
    /// particular query shape is supported: the appliance is unreachable,
    /// the key is bad, or the caller gave up.
    ///
    /// Fallback chains stop on these instead of moving to the next candidate.
    pub fn is_fatal_for_fallback(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Tls(_)
                | Self::InvalidUrl(_)
                | Self::Cancelled
                | Self::Authentication { .. }
        )
    }
}
