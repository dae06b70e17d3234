#![allow(clippy::unwrap_used)]
// Integration tests for `XmlApiClient` using wiremock.

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use panfly_api::{Error, Params, Route, TransportConfig, XmlApiClient};

// ── Helpers ─────────────────────────────────────────────────────────

/// Matches a form-encoded body carrying `name=value`.
struct FormParam(&'static str, &'static str);

impl Match for FormParam {
    fn matches(&self, request: &Request) -> bool {
        url::form_urlencoded::parse(&request.body).any(|(k, v)| k == self.0 && v == self.1)
    }
}

/// Matches a form-encoded body that does NOT carry `name`.
struct NoFormParam(&'static str);

impl Match for NoFormParam {
    fn matches(&self, request: &Request) -> bool {
        !url::form_urlencoded::parse(&request.body).any(|(k, _)| k == self.0)
    }
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/xml")
        .set_body_string(body)
}

async fn setup() -> (MockServer, XmlApiClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let client = XmlApiClient::with_client(reqwest::Client::new(), &base).unwrap();
    (server, client)
}

fn show_info() -> Params {
    Params::op("<show><system><info></info></system></show>")
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_key_travels_in_header_only() {
    let server = MockServer::start().await;
    let key: SecretString = "LUFRPT14MW5xOEo1R09KVlBZNnpnemh0VHRBOWl6TGM9".to_string().into();
    let client = XmlApiClient::new(&server.uri(), &key, &TransportConfig::default()).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(header(
            "X-PAN-KEY",
            "LUFRPT14MW5xOEo1R09KVlBZNnpnemh0VHRBOWl6TGM9",
        ))
        .and(NoFormParam("key"))
        .and(FormParam("type", "op"))
        .respond_with(xml(
            r#"<response status="success"><result><system><hostname>fw01</hostname></system></result></response>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let env = client
        .query(&show_info(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(env.is_success());
    assert_eq!(env.payload, "<system><hostname>fw01</hostname></system>");
}

#[tokio::test]
async fn test_key_parameter_is_refused() {
    let (_server, client) = setup().await;
    let params = show_info().with("key", "oops");

    let result = client.send(&params, &CancellationToken::new()).await;

    assert!(
        matches!(result, Err(Error::InvalidParameter { ref name, .. }) if name == "key"),
        "expected InvalidParameter, got: {result:?}"
    );
}

// ── Target routing ──────────────────────────────────────────────────

#[tokio::test]
async fn test_target_injection_and_removal() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(FormParam("target", "0011223344"))
        .respond_with(xml(
            r#"<response status="success"><result>device</result></response>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(NoFormParam("target"))
        .respond_with(xml(
            r#"<response status="success"><result>aggregator</result></response>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();

    assert_eq!(client.query(&show_info(), &cancel).await.unwrap().payload, "aggregator");

    client.set_target("0011223344");
    assert_eq!(client.query(&show_info(), &cancel).await.unwrap().payload, "device");
    assert_eq!(client.query(&show_info(), &cancel).await.unwrap().payload, "device");

    client.clear_target();
    assert_eq!(client.target(), None);
    assert_eq!(client.query(&show_info(), &cancel).await.unwrap().payload, "aggregator");
}

#[tokio::test]
async fn test_explicit_route_overrides_target() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(NoFormParam("target"))
        .respond_with(xml(
            r#"<response status="success"><result>aggregator</result></response>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(FormParam("target", "998877"))
        .respond_with(xml(
            r#"<response status="success"><result>other</result></response>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    client.set_target("0011223344");
    let cancel = CancellationToken::new();

    let env = client
        .query_routed(&show_info(), &Route::Aggregator, &cancel)
        .await
        .unwrap();
    assert_eq!(env.payload, "aggregator");

    let env = client
        .query_routed(&show_info(), &Route::Device("998877".into()), &cancel)
        .await
        .unwrap();
    assert_eq!(env.payload, "other");

    // The client's own target is untouched by per-call routes.
    assert_eq!(client.target().as_deref(), Some("0011223344"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_envelope_is_protocol_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(xml(
            r#"<response status="error" code="17"><msg><line>show -&gt; foo is unexpected</line></msg></response>"#,
        ))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();

    // `send` hands back the envelope untouched...
    let env = client.send(&show_info(), &cancel).await.unwrap();
    assert!(!env.is_success());

    // ...`query` turns it into a structured error.
    match client.query(&show_info(), &cancel).await {
        Err(Error::Api {
            ref status,
            ref code,
            ref message,
        }) => {
            assert_eq!(status, "error");
            assert_eq!(code.as_deref(), Some("17"));
            assert!(message.contains("foo is unexpected"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"<response status="error" code="403"><result><msg>Invalid Credential</msg></result></response>"#,
        ))
        .mount(&server)
        .await;

    let result = client.send(&show_info(), &CancellationToken::new()).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "Invalid Credential");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_envelope_is_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(xml("<html><body>captive portal</body></html>"))
        .mount(&server)
        .await;

    let result = client.send(&show_info(), &CancellationToken::new()).await;

    assert!(
        matches!(result, Err(Error::Envelope { .. })),
        "expected Envelope error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_oversized_body_is_truncated() {
    let (server, client) = setup().await;
    let client = client.with_max_body_bytes(64);

    let filler = "<entry>x</entry>".repeat(100);
    Mock::given(method("POST"))
        .respond_with(xml(&format!(
            r#"<response status="success"><result>{filler}</result></response>"#
        )))
        .mount(&server)
        .await;

    match client.send(&show_info(), &CancellationToken::new()).await {
        Err(Error::Envelope { ref body, .. }) => assert_eq!(body.len(), 64),
        other => panic!("expected truncated Envelope error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_cancelled_call() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(
            xml(r#"<response status="success"><result/></response>"#)
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client.send(&show_info(), &cancel).await;
    assert!(matches!(result, Err(Error::Cancelled)), "got: {result:?}");
}

// ── Job submission ──────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_job_returns_handle() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(FormParam("type", "log"))
        .and(FormParam("log-type", "traffic"))
        .and(FormParam("nlogs", "20"))
        .respond_with(xml(
            r#"<response status="success" code="19"><result><msg><line>query job enqueued with jobid 71</line></msg><job>71</job></result></response>"#,
        ))
        .mount(&server)
        .await;

    let handle = client
        .submit_job(
            &Params::log_query("traffic", 20, None),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(handle.job_id, "71");
}

#[tokio::test]
async fn test_submit_job_without_id_is_hard_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(xml(
            r#"<response status="success"><result><msg>nothing queued</msg></result></response>"#,
        ))
        .mount(&server)
        .await;

    let result = client
        .submit_job(
            &Params::log_query("traffic", 20, None),
            &CancellationToken::new(),
        )
        .await;

    assert!(
        matches!(result, Err(Error::JobSubmission { ref message }) if message == "nothing queued"),
        "expected JobSubmission error, got: {result:?}"
    );
}
