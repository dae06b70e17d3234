// XML API HTTP client
//
// Wraps `reqwest::Client` with endpoint construction, header-based key
// injection, device targeting, capped body reads and envelope decoding.
// Domain queries live in `panfly-core`; this module only moves envelopes.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use bytes::BytesMut;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::api_key_headers;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::params::{Params, Route};
use crate::transport::{DEFAULT_MAX_BODY_BYTES, TransportConfig};

/// Raw client for the appliance's XML management API.
///
/// Owns the optional "current target" used when talking to an aggregator.
/// The target is swapped atomically; each call reads it exactly once, so a
/// concurrent `set_target` affects later calls but never splits one call.
pub struct XmlApiClient {
    http: reqwest::Client,
    endpoint: Url,
    target: ArcSwapOption<String>,
    max_body_bytes: usize,
}

impl XmlApiClient {
    /// Create a client for `host` authenticating with `api_key`.
    ///
    /// `host` may be a bare hostname (`fw01.example.net`), `host:port`, or a
    /// full URL; `https` is assumed when no scheme is given.
    pub fn new(
        host: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let headers = api_key_headers(api_key)?;
        let http = transport.build_client_with_headers(headers)?;
        let endpoint = Self::normalize_endpoint(host)?;
        Ok(Self {
            http,
            endpoint,
            target: ArcSwapOption::empty(),
            max_body_bytes: transport.max_body_bytes,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for authentication headers. Used by tests
    /// and by embedders that share one connection pool.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Result<Self, Error> {
        Ok(Self {
            http,
            endpoint: Self::normalize_endpoint(base_url.as_str())?,
            target: ArcSwapOption::empty(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Override the response-size ceiling.
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Build `{scheme}://{host}[:port]/api/`.
    fn normalize_endpoint(raw: &str) -> Result<Url, Error> {
        let raw = raw.trim();
        let mut url = if raw.contains("://") {
            Url::parse(raw)?
        } else {
            Url::parse(&format!("https://{raw}"))?
        };
        url.set_path("/api/");
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// The resolved API endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Target routing ───────────────────────────────────────────────

    /// Route subsequent calls to the managed device with this serial.
    ///
    /// An empty (or whitespace) serial clears the target.
    pub fn set_target(&self, serial: impl Into<String>) {
        let serial = serial.into().trim().to_owned();
        if serial.is_empty() {
            self.clear_target();
            return;
        }
        debug!(target_serial = %serial, "setting target device");
        self.target.store(Some(Arc::new(serial)));
    }

    /// Address the aggregator itself on subsequent calls.
    pub fn clear_target(&self) {
        debug!("clearing target device");
        self.target.store(None);
    }

    /// The current target serial, if any.
    pub fn target(&self) -> Option<String> {
        self.target.load().as_deref().cloned()
    }

    pub fn has_target(&self) -> bool {
        self.target.load().is_some()
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one request using the current target and return its envelope,
    /// whatever its status.
    pub async fn send(&self, params: &Params, cancel: &CancellationToken) -> Result<Envelope, Error> {
        self.send_routed(params, &Route::Current, cancel).await
    }

    /// Send one request with an explicit route.
    pub async fn send_routed(
        &self,
        params: &Params,
        route: &Route,
        cancel: &CancellationToken,
    ) -> Result<Envelope, Error> {
        params.validate()?;
        let current = self.target.load_full();
        let target = route.resolve(current.as_deref().map(String::as_str));
        let routed = params.routed(target.as_deref());

        debug!(params = %routed, "POST {}", self.endpoint);

        let form: Vec<(&str, &str)> = routed.iter().collect();
        let request = self.http.post(self.endpoint.clone()).form(&form);

        let exchange = async {
            let resp = request.send().await.map_err(Error::Transport)?;
            self.read_envelope(resp).await
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled by caller");
                Err(Error::Cancelled)
            }
            result = exchange => result,
        }
    }

    /// Send one request (current target) and require a success envelope.
    pub async fn query(&self, params: &Params, cancel: &CancellationToken) -> Result<Envelope, Error> {
        self.send(params, cancel).await?.require_success()
    }

    /// Send one request with an explicit route and require a success envelope.
    pub async fn query_routed(
        &self,
        params: &Params,
        route: &Route,
        cancel: &CancellationToken,
    ) -> Result<Envelope, Error> {
        self.send_routed(params, route, cancel)
            .await?
            .require_success()
    }

    /// Map HTTP status, read the body under the size cap, decode the envelope.
    async fn read_envelope(&self, resp: reqwest::Response) -> Result<Envelope, Error> {
        let status = resp.status();
        let body = self.read_capped(resp).await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let message = Envelope::parse(&body)
                .ok()
                .map(|env| env.error_message())
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(Error::Authentication { message });
        }

        if !status.is_success() {
            // Error bodies are usually still envelopes; surface their message.
            return match Envelope::parse(&body) {
                Ok(env) if !env.is_success() => Ok(env),
                _ => Err(Error::Api {
                    status: format!("http-{}", status.as_u16()),
                    code: None,
                    message: format!("HTTP {status}: {}", preview(&body)),
                }),
            };
        }

        Envelope::parse(&body)
    }

    /// Read the body, keeping at most `max_body_bytes`. Overflow truncates.
    async fn read_capped(&self, mut resp: reqwest::Response) -> Result<String, Error> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = resp.chunk().await.map_err(Error::Transport)? {
            let room = self.max_body_bytes.saturating_sub(buf.len());
            if chunk.len() > room {
                buf.extend_from_slice(chunk.get(..room).unwrap_or_default());
                warn!(
                    limit = self.max_body_bytes,
                    "response body exceeded size ceiling, truncating"
                );
                break;
            }
            buf.extend_from_slice(&chunk);
        }
        trace!(bytes = buf.len(), "read response body");
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
