use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header carrying the API key on every request.
///
/// The protocol also accepts the key as a `key=` parameter; we never use
/// that form because parameters end up in proxy and appliance access logs.
pub const API_KEY_HEADER: &str = "X-PAN-KEY";

/// Parameter names that would leak secrets if sent in the parameter set.
pub(crate) const FORBIDDEN_PARAMS: &[&str] = &["key", "password", "user"];

/// Build the default header map for an API key.
///
/// The header value is flagged sensitive so reqwest and tracing never print it.
pub fn api_key_headers(api_key: &SecretString) -> Result<HeaderMap, Error> {
    let mut value =
        HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
            message: format!("invalid API key header value: {e}"),
        })?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, value);
    Ok(headers)
}
