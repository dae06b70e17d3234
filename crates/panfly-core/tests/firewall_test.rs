#![allow(clippy::unwrap_used)]
// Integration tests for `Firewall` operations against a wiremock appliance.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::method;
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use panfly_api::XmlApiClient;
use panfly_core::{CoreError, Firewall, JobState, PollConfig, RuleLayer, SessionFilter};

// ── Helpers ─────────────────────────────────────────────────────────

fn form(request: &Request) -> Vec<(String, String)> {
    url::form_urlencoded::parse(&request.body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn form_value(request: &Request, key: &str) -> Option<String> {
    form(request).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// `name=value` present in the form body.
struct FormParam(&'static str, &'static str);

impl Match for FormParam {
    fn matches(&self, request: &Request) -> bool {
        form_value(request, self.0).as_deref() == Some(self.1)
    }
}

/// Form field `name` contains `needle`.
struct FormContains(&'static str, &'static str);

impl Match for FormContains {
    fn matches(&self, request: &Request) -> bool {
        form_value(request, self.0).is_some_and(|v| v.contains(self.1))
    }
}

struct NoFormParam(&'static str);

impl Match for NoFormParam {
    fn matches(&self, request: &Request) -> bool {
        form_value(request, self.0).is_none()
    }
}

fn success(payload: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        r#"<response status="success"><result>{payload}</result></response>"#
    ))
}

fn failure(code: &str, msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        r#"<response status="error" code="{code}"><msg><line>{msg}</line></msg></response>"#
    ))
}

async fn setup() -> (MockServer, Firewall) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let client = XmlApiClient::with_client(reqwest::Client::new(), &base).unwrap();
    let poll = PollConfig {
        interval: Duration::from_millis(10),
        max_attempts: 5,
    };
    (server, Firewall::from_parts(client, "vsys1".into(), poll))
}

/// Anything not matched by a more specific mock: empty success.
async fn mount_empty_fallback(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(success(""))
        .with_priority(100)
        .mount(server)
        .await;
}

const PRE_PUSHED: &str = "/config/panorama/vsys/entry[@name='vsys1']/pre-rulebase/security/rules";
const LOCAL_PRIMARY: &str = "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='vsys1']/rulebase/security/rules";
const LOCAL_SECONDARY: &str = "/config/devices/entry/vsys/entry[@name='vsys1']/rulebase/security/rules";
const POST_SHARED: &str = "/config/shared/post-rulebase/security/rules";

fn rule(name: &str, action: &str) -> String {
    format!(r#"<rules><entry name="{name}"><action>{action}</action></entry></rules>"#)
}

async fn mount_rules(server: &MockServer, xpath: &'static str, action: &'static str, body: String) {
    Mock::given(method("POST"))
        .and(FormParam("type", "config"))
        .and(FormParam("action", action))
        .and(FormParam("xpath", xpath))
        .respond_with(success(&body))
        .mount(server)
        .await;
}

async fn mount_hits(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(FormParam("type", "op"))
        .and(FormContains("cmd", "<rule-hit-count>"))
        .respond_with(response)
        .mount(server)
        .await;
}

// ── Rulebase aggregation ────────────────────────────────────────────

#[tokio::test]
async fn test_rulebase_layers_are_ordered_and_hits_joined() {
    let (server, fw) = setup().await;

    // Post answers on a secondary candidate, local only on `get`.
    mount_rules(&server, PRE_PUSHED, "show", rule("block-known-bad", "deny")).await;
    mount_rules(&server, LOCAL_PRIMARY, "get", rule("allow-outbound", "allow")).await;
    mount_rules(&server, POST_SHARED, "show", rule("default-deny", "deny")).await;
    mount_hits(
        &server,
        success(
            r#"<rule-hit-count><vsys><entry name="vsys1"><rule-base><entry name="security"><rules>
                 <entry name="allow-outbound"><hit-count>42</hit-count>
                   <last-hit-timestamp>1700000000</last-hit-timestamp></entry>
               </rules></entry></rule-base></entry></vsys></rule-hit-count>"#,
        ),
    )
    .await;
    mount_empty_fallback(&server).await;

    let rules = fw.security_rules(&CancellationToken::new()).await.unwrap();

    let summary: Vec<(usize, &str, RuleLayer)> = rules
        .iter()
        .map(|r| (r.position, r.name.as_str(), r.layer))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "block-known-bad", RuleLayer::Pre),
            (2, "allow-outbound", RuleLayer::Local),
            (3, "default-deny", RuleLayer::Post),
        ]
    );
    assert_eq!(rules[1].hit_count, 42);
    assert!(rules[1].last_hit.is_some());
    assert_eq!(rules[0].hit_count, 0);
    assert_eq!(rules[2].hit_count, 0);
}

#[tokio::test]
async fn test_duplicate_rule_names_last_layer_gets_hits() {
    let (server, fw) = setup().await;

    mount_rules(&server, PRE_PUSHED, "show", rule("shared-name", "allow")).await;
    mount_rules(&server, POST_SHARED, "show", rule("shared-name", "deny")).await;
    mount_hits(
        &server,
        success(r#"<rules><entry name="shared-name"><hit-count>5</hit-count></entry></rules>"#),
    )
    .await;
    mount_empty_fallback(&server).await;

    let rules = fw.security_rules(&CancellationToken::new()).await.unwrap();

    assert_eq!(rules.len(), 2);
    assert_eq!((rules[0].layer, rules[0].hit_count), (RuleLayer::Pre, 0));
    assert_eq!((rules[1].layer, rules[1].hit_count), (RuleLayer::Post, 5));
}

#[tokio::test]
async fn test_rejected_candidates_are_skipped() {
    let (server, fw) = setup().await;

    for action in ["show", "get"] {
        Mock::given(method("POST"))
            .and(FormParam("action", action))
            .and(FormParam("xpath", LOCAL_PRIMARY))
            .respond_with(failure("7", "Object doesn't exist"))
            .mount(&server)
            .await;
    }
    mount_rules(&server, LOCAL_SECONDARY, "show", rule("allow-dns", "allow")).await;
    mount_hits(&server, failure("17", "unsupported")).await;
    mount_empty_fallback(&server).await;

    let rules = fw.security_rules(&CancellationToken::new()).await.unwrap();

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "allow-dns");
    assert_eq!(rules[0].position, 1);
    // Hit-count report rejected: statistics stay at zero.
    assert_eq!(rules[0].hit_count, 0);
}

#[tokio::test]
async fn test_authentication_failure_aborts_aggregation() {
    let (server, fw) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let result = fw.security_rules(&CancellationToken::new()).await;
    assert!(
        matches!(result, Err(CoreError::AuthenticationFailed { .. })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_empty_rulebase_is_not_an_error() {
    let (server, fw) = setup().await;
    mount_empty_fallback(&server).await;

    let rules = fw.nat_rules(&CancellationToken::new()).await.unwrap();
    assert!(rules.is_empty());
}

// ── Target routing ──────────────────────────────────────────────────

#[tokio::test]
async fn test_managed_devices_address_the_aggregator() {
    let (server, fw) = setup().await;

    Mock::given(method("POST"))
        .and(FormContains("cmd", "<devices>"))
        .and(NoFormParam("target"))
        .respond_with(success(
            r#"<devices><entry name="0011223344"><serial>0011223344</serial>
                 <hostname>fw-branch-1</hostname><connected>yes</connected></entry></devices>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    fw.set_target("0011223344");
    let devices = fw.managed_devices(&CancellationToken::new()).await.unwrap();

    assert_eq!(devices.len(), 1);
    assert!(devices[0].connected);
    assert_eq!(fw.target().as_deref(), Some("0011223344"));
}

#[tokio::test]
async fn test_target_routes_domain_calls() {
    let (server, fw) = setup().await;

    Mock::given(method("POST"))
        .and(FormParam("target", "0011223344"))
        .respond_with(success(
            "<system><hostname>fw-branch-1</hostname><serial>0011223344</serial></system>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(NoFormParam("target"))
        .respond_with(success(
            "<system><hostname>panorama</hostname><serial>000700001</serial></system>",
        ))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    fw.set_target("0011223344");
    assert_eq!(fw.system_info(&cancel).await.unwrap().hostname, "fw-branch-1");
    fw.clear_target();
    assert_eq!(fw.system_info(&cancel).await.unwrap().hostname, "panorama");
}

// ── Sessions ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_filter_and_idempotence() {
    let (server, fw) = setup().await;

    Mock::given(method("POST"))
        .and(FormParam(
            "cmd",
            "<show><session><all><filter><from>trust</from><application>ssl</application></filter></all></session></show>",
        ))
        .respond_with(success(
            "<entry><idx>1</idx><src>10.0.0.5</src><dst>1.1.1.1</dst><dport>443</dport></entry>\
             <entry><idx>2</idx><src>10.0.0.6</src><dst>8.8.8.8</dst><dport>443</dport></entry>",
        ))
        .expect(2)
        .mount(&server)
        .await;

    let filter: SessionFilter = "from=trust app=ssl".parse().unwrap();
    let cancel = CancellationToken::new();

    let first = fw.sessions(&filter, &cancel).await.unwrap();
    let second = fw.sessions(&filter, &cancel).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unparseable_payload_is_empty() {
    let (server, fw) = setup().await;

    Mock::given(method("POST"))
        .respond_with(success("<![CDATA[feature not supported on this platform]]>"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    assert!(fw.arp_table(&cancel).await.unwrap().is_empty());
    assert!(fw.interfaces(&cancel).await.unwrap().is_empty());
    assert_eq!(fw.session_info(&cancel).await.unwrap().max_sessions, 0);
}

// ── Routes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_routes_fall_back_to_advanced_routing() {
    let (server, fw) = setup().await;

    Mock::given(method("POST"))
        .and(FormContains("cmd", "<routing>"))
        .respond_with(failure("17", "show -> routing is unexpected"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(FormContains("cmd", "<advanced-routing>"))
        .respond_with(success(
            r#"<json>{"default": {"10.0.0.0/8": [{"prefix": "10.0.0.0/8", "protocol": "static",
                "nexthops": [{"ip": "10.255.0.1", "interfaceName": "ethernet1/2"}]}]}}</json>"#,
        ))
        .mount(&server)
        .await;

    let routes = fw.routes(&CancellationToken::new()).await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].nexthop, "10.255.0.1");
}

// ── Logs ────────────────────────────────────────────────────────────

async fn mount_log_submit(server: &MockServer) {
    Mock::given(method("POST"))
        .and(FormParam("type", "log"))
        .and(FormParam("log-type", "traffic"))
        .and(FormParam("nlogs", "100"))
        .and(NoFormParam("job-id"))
        .respond_with(success(
            "<msg><line>query job enqueued with jobid 71</line></msg><job>71</job>",
        ))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_traffic_log_job_finishes() {
    let (server, fw) = setup().await;
    mount_log_submit(&server).await;

    Mock::given(method("POST"))
        .and(FormParam("action", "get"))
        .and(FormParam("job-id", "71"))
        .respond_with(success(
            r#"<job><id>71</id><status>FIN</status></job><log><logs count="1" progress="100">
                 <entry logid="1"><receive_time>2024/03/12 10:00:00</receive_time>
                   <src>10.0.0.5</src><dst>1.1.1.1</dst><dport>53</dport><app>dns</app></entry>
               </logs></log>"#,
        ))
        .mount(&server)
        .await;

    let outcome = fw
        .traffic_logs_detailed(None, 0, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.state, JobState::Finished);
    assert_eq!(outcome.job_id, "71");
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].application, "dns");
}

#[tokio::test]
async fn test_traffic_log_job_times_out_empty() {
    let (server, fw) = setup().await;
    mount_log_submit(&server).await;

    Mock::given(method("POST"))
        .and(FormParam("job-id", "71"))
        .respond_with(success(
            "<job><id>71</id><status>ACT</status></job><log><logs count=\"0\"/></log>",
        ))
        .expect(5)
        .mount(&server)
        .await;

    let outcome = fw
        .traffic_logs_detailed(Some(""), -1, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.state, JobState::TimedOut);
    assert!(outcome.entries.is_empty());
}

#[tokio::test]
async fn test_log_submission_without_job_id_fails() {
    let (server, fw) = setup().await;

    Mock::given(method("POST"))
        .and(FormParam("type", "log"))
        .respond_with(success("<msg>query rejected</msg>"))
        .mount(&server)
        .await;

    let result = fw.system_logs(None, 10, &CancellationToken::new()).await;
    assert!(
        matches!(result, Err(CoreError::JobSubmission { .. })),
        "got: {result:?}"
    );
}
