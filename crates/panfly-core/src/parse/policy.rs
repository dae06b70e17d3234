// Security rule, NAT rule and hit-count parsers.

use roxmltree::Node;

use super::xml::{Fields, child, text_of};
use super::{Record, Strategy, extract};
use crate::model::{HitCount, NatRule, SecurityRule};

const SECURITY_RULES: &[Strategy<SecurityRule>] = &[
    Strategy::path("rules", &["rules", "entry"]),
    Strategy::path("wrapped rules", &["*", "rules", "entry"]),
    Strategy::path("entries", &["entry"]),
];

const NAT_RULES: &[Strategy<NatRule>] = &[
    Strategy::path("rules", &["rules", "entry"]),
    Strategy::path("wrapped rules", &["*", "rules", "entry"]),
    Strategy::path("entries", &["entry"]),
];

impl Record for SecurityRule {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            name: f.text(&["name"]),
            uuid: f.text(&["uuid"]),
            action: f.text(&["action"]),
            from_zones: f.members("from"),
            to_zones: f.members("to"),
            sources: f.members("source"),
            destinations: f.members("destination"),
            source_users: f.members("source-user"),
            applications: f.members("application"),
            services: f.members("service"),
            categories: f.members("category"),
            tags: f.members("tag"),
            profile_group: f.text(&["profile-setting/group/member", "profile-setting/group"]),
            description: f.text(&["description"]),
            disabled: f.flag(&["disabled"]),
            log_start: f.flag(&["log-start"]),
            log_end: f.flag(&["log-end"]),
            ..Self::default()
        }
    }

    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

impl Record for NatRule {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            name: f.text(&["name"]),
            uuid: f.text(&["uuid"]),
            nat_type: f.text(&["nat-type"]),
            from_zones: f.members("from"),
            to_zones: f.members("to"),
            sources: f.members("source"),
            destinations: f.members("destination"),
            service: f.text(&["service"]),
            to_interface: f.text(&["to-interface"]),
            source_translation: source_translation(node),
            destination_translation: destination_translation(node),
            tags: f.members("tag"),
            description: f.text(&["description"]),
            disabled: f.flag(&["disabled"]),
            ..Self::default()
        }
    }

    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

/// `"<kind> <values...>"`, e.g. `dynamic-ip-and-port ethernet1/1`.
fn source_translation(rule: Node<'_, '_>) -> String {
    let Some(translation) = child(rule, "source-translation") else {
        return String::new();
    };
    let Some(kind) = translation.children().find(Node::is_element) else {
        return String::new();
    };
    let values: Vec<String> = kind
        .descendants()
        .filter(|n| n.is_element() && n.children().all(|c| !c.is_element()))
        .map(text_of)
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        kind.tag_name().name().to_owned()
    } else {
        format!("{} {}", kind.tag_name().name(), values.join(" "))
    }
}

/// `address[:port]` of a static or dynamic destination translation.
fn destination_translation(rule: Node<'_, '_>) -> String {
    let Some(translation) = child(rule, "destination-translation")
        .or_else(|| child(rule, "dynamic-destination-translation"))
    else {
        return String::new();
    };
    let f = Fields::new(translation);
    let address = f.text(&["translated-address"]);
    match f.opt(&["translated-port"]) {
        Some(port) if !address.is_empty() => format!("{address}:{port}"),
        _ => address,
    }
}

pub(crate) fn security_rules(payload: &str) -> Vec<SecurityRule> {
    extract(payload, SECURITY_RULES)
}

pub(crate) fn nat_rules(payload: &str) -> Vec<NatRule> {
    extract(payload, NAT_RULES)
}

// ── Hit counts ──────────────────────────────────────────────────────

const HIT_COUNTS: &[Strategy<HitCount>] = &[
    Strategy::path(
        "rule-hit-count",
        &["rule-hit-count", "*", "entry", "rule-base", "entry", "rules", "entry"],
    ),
    Strategy::path(
        "scope rule-base",
        &["*", "entry", "rule-base", "entry", "rules", "entry"],
    ),
    Strategy::path("rules", &["rules", "entry"]),
    Strategy::path("entries", &["entry"]),
];

impl Record for HitCount {
    fn from_node(node: Node<'_, '_>) -> Self {
        let f = Fields::new(node);
        Self {
            name: f.text(&["name"]),
            count: f.int(&["hit-count", "hit_count", "count"]),
            first_hit: f.time(&["first-hit-timestamp", "first-hit"]),
            last_hit: f.time(&["last-hit-timestamp", "last-hit"]),
            last_reset: f.time(&["last-reset-timestamp", "last-reset"]),
        }
    }

    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

pub(crate) fn hit_counts(payload: &str) -> Vec<HitCount> {
    extract(payload, HIT_COUNTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RULES: &str = r#"<entry name="allow-outbound" uuid="a1b2">
          <from><member>trust</member></from><to><member>untrust</member></to>
          <source><member>any</member></source><destination><member>any</member></destination>
          <application><member>ssl</member><member>web-browsing</member></application>
          <service><member>application-default</member></service>
          <action>allow</action><log-end>yes</log-end>
          <profile-setting><group><member>default</member></group></profile-setting>
        </entry>
        <entry name="deny-all"><action>deny</action><disabled>yes</disabled></entry>"#;

    #[test]
    fn security_rules_wrapped_and_unwrapped_agree() {
        let wrapped = security_rules(&format!("<rules>{RULES}</rules>"));
        let bare = security_rules(RULES);
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].applications, vec!["ssl", "web-browsing"]);
        assert_eq!(wrapped[0].profile_group, "default");
        assert!(wrapped[0].log_end);
        assert!(wrapped[1].disabled);
        assert_eq!(wrapped[0].position, 0);
    }

    #[test]
    fn nat_translation_summaries() {
        let payload = r#"<rules>
            <entry name="outbound-pat">
              <source-translation><dynamic-ip-and-port><interface-address>
                <interface>ethernet1/1</interface></interface-address></dynamic-ip-and-port>
              </source-translation>
              <to><member>untrust</member></to><service>any</service>
            </entry>
            <entry name="web-dnat">
              <destination-translation><translated-address>10.0.0.5</translated-address>
                <translated-port>8443</translated-port></destination-translation>
            </entry></rules>"#;
        let rules = nat_rules(payload);
        assert_eq!(rules[0].source_translation, "dynamic-ip-and-port ethernet1/1");
        assert_eq!(rules[1].destination_translation, "10.0.0.5:8443");
        assert_eq!(rules[1].source_translation, "");
    }

    #[test]
    fn hit_counts_from_nested_report() {
        let payload = r#"<rule-hit-count><vsys><entry name="vsys1"><rule-base>
            <entry name="security"><rules>
              <entry name="allow-outbound"><hit-count>42</hit-count>
                <last-hit-timestamp>1700000000</last-hit-timestamp>
                <last-reset-timestamp>0</last-reset-timestamp>
                <first-hit-timestamp>1690000000</first-hit-timestamp></entry>
              <entry name="deny-all"><hit-count>0</hit-count></entry>
            </rules></entry></rule-base></entry></vsys></rule-hit-count>"#;
        let hits = hit_counts(payload);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].count, 42);
        assert_eq!(hits[0].last_reset, None);
        assert_eq!(hits[0].last_hit.map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(hits[1].count, 0);
    }
}
