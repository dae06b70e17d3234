// ── Rulebase aggregation ──
//
// Rules are evaluated pre → local → post. Each layer has several candidate
// xpaths (pushed, shared, device-group) and each candidate is tried with
// `show` (running) then `get` (candidate config). The first non-empty parse
// wins the layer. Positions are assigned across the concatenation, then one
// hit-count report is joined on by rule name.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use panfly_api::{ConfigAction, Params, XmlApiClient};

use crate::error::CoreError;
use crate::model::{HitCount, NatRule, RuleLayer, RulebaseKind, SecurityRule};
use crate::parse::policy;

/// A rule type the aggregator can place and enrich.
pub(crate) trait Rule: Sized {
    const KIND: RulebaseKind;

    fn parse(payload: &str) -> Vec<Self>;
    fn name(&self) -> &str;
    fn place(&mut self, position: usize, layer: RuleLayer);
    fn apply_hits(&mut self, hits: &HitCount);
}

impl Rule for SecurityRule {
    const KIND: RulebaseKind = RulebaseKind::Security;

    fn parse(payload: &str) -> Vec<Self> {
        policy::security_rules(payload)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn place(&mut self, position: usize, layer: RuleLayer) {
        self.position = position;
        self.layer = layer;
    }

    fn apply_hits(&mut self, hits: &HitCount) {
        self.hit_count = hits.count;
        self.first_hit = hits.first_hit;
        self.last_hit = hits.last_hit;
        self.last_reset = hits.last_reset;
    }
}

impl Rule for NatRule {
    const KIND: RulebaseKind = RulebaseKind::Nat;

    fn parse(payload: &str) -> Vec<Self> {
        policy::nat_rules(payload)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn place(&mut self, position: usize, layer: RuleLayer) {
        self.position = position;
        self.layer = layer;
    }

    fn apply_hits(&mut self, hits: &HitCount) {
        self.hit_count = hits.count;
        self.first_hit = hits.first_hit;
        self.last_hit = hits.last_hit;
        self.last_reset = hits.last_reset;
    }
}

/// Candidate xpaths for one layer, most specific first.
pub(crate) fn candidate_xpaths(layer: RuleLayer, kind: RulebaseKind, vsys: &str) -> Vec<String> {
    match layer {
        RuleLayer::Local => vec![
            format!(
                "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='{vsys}']/rulebase/{kind}/rules"
            ),
            format!("/config/devices/entry/vsys/entry[@name='{vsys}']/rulebase/{kind}/rules"),
            format!("/config/devices/entry/vsys/entry/rulebase/{kind}/rules"),
        ],
        RuleLayer::Pre | RuleLayer::Post => {
            let base = if layer == RuleLayer::Pre {
                "pre-rulebase"
            } else {
                "post-rulebase"
            };
            vec![
                format!("/config/panorama/vsys/entry[@name='{vsys}']/{base}/{kind}/rules"),
                format!("/config/shared/{base}/{kind}/rules"),
                format!(
                    "/config/devices/entry[@name='localhost.localdomain']/device-group/entry/{base}/{kind}/rules"
                ),
            ]
        }
    }
}

/// Operational command for the per-vsys hit-count report.
pub(crate) fn hit_count_command(kind: RulebaseKind, vsys: &str) -> String {
    format!(
        "<show><rule-hit-count><vsys><vsys-name><entry name='{vsys}'><rule-base>\
         <entry name='{kind}'><rules><all/></rules></entry></rule-base></entry>\
         </vsys-name></vsys></rule-hit-count></show>"
    )
}

/// Try each xpath with `show` then `get`; the first non-empty parse wins.
///
/// Protocol and decode failures move on to the next candidate. Transport,
/// authentication and cancellation errors abort.
pub(crate) async fn first_config_hit<T: Send>(
    client: &XmlApiClient,
    xpaths: &[String],
    parse: fn(&str) -> Vec<T>,
    cancel: &CancellationToken,
) -> Result<Vec<T>, CoreError> {
    for xpath in xpaths {
        for action in [ConfigAction::Show, ConfigAction::Get] {
            let params = Params::config(action, xpath.as_str());
            match client.query(&params, cancel).await {
                Ok(env) => {
                    let records = parse(&env.payload);
                    if !records.is_empty() {
                        debug!(xpath = %xpath, action = action.as_str(), count = records.len(), "config candidate matched");
                        return Ok(records);
                    }
                }
                Err(e) if e.is_fatal_for_fallback() => return Err(e.into()),
                Err(e) => {
                    debug!(xpath = %xpath, action = action.as_str(), error = %e, "config candidate failed, trying next");
                }
            }
        }
    }
    Ok(Vec::new())
}

/// Fetch, order and enrich one rule base.
pub(crate) async fn aggregate<R: Rule + Send>(
    client: &XmlApiClient,
    vsys: &str,
    cancel: &CancellationToken,
) -> Result<Vec<R>, CoreError> {
    let mut rules: Vec<R> = Vec::new();

    for layer in RuleLayer::ALL {
        let xpaths = candidate_xpaths(layer, R::KIND, vsys);
        let fetched = first_config_hit(client, &xpaths, R::parse, cancel).await?;
        debug!(kind = %R::KIND, %layer, count = fetched.len(), "fetched rulebase layer");
        for mut rule in fetched {
            rule.place(rules.len() + 1, layer);
            rules.push(rule);
        }
    }

    if rules.is_empty() {
        return Ok(rules);
    }

    let params = Params::op(hit_count_command(R::KIND, vsys));
    match client.query(&params, cancel).await {
        Ok(env) => join_hits(&mut rules, &policy::hit_counts(&env.payload)),
        Err(e) if e.is_fatal_for_fallback() => return Err(e.into()),
        Err(e) => warn!(kind = %R::KIND, error = %e, "hit-count report unavailable, statistics left at zero"),
    }

    Ok(rules)
}

/// Join hit statistics by rule name. Names are unique per layer only; when
/// several rules share a name the last one in evaluation order receives the
/// statistics and the others keep zero.
pub(crate) fn join_hits<R: Rule>(rules: &mut [R], hits: &[HitCount]) {
    let index: HashMap<&str, usize> = rules
        .iter()
        .enumerate()
        .map(|(i, rule)| (rule.name(), i))
        .collect();
    let targets: Vec<(usize, &HitCount)> = hits
        .iter()
        .filter_map(|hit| index.get(hit.name.as_str()).map(|i| (*i, hit)))
        .collect();
    for (i, hit) in targets {
        if let Some(rule) = rules.get_mut(i) {
            rule.apply_hits(hit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, layer: RuleLayer, position: usize) -> SecurityRule {
        SecurityRule {
            name: name.into(),
            layer,
            position,
            ..Default::default()
        }
    }

    fn hits(name: &str, count: i64) -> HitCount {
        HitCount {
            name: name.into(),
            count,
            ..Default::default()
        }
    }

    #[test]
    fn join_by_name_leaves_unmatched_at_zero() {
        let mut rules = vec![
            rule("allow-outbound", RuleLayer::Local, 1),
            rule("deny-all", RuleLayer::Local, 2),
        ];
        join_hits(&mut rules, &[hits("allow-outbound", 42), hits("unknown", 7)]);
        assert_eq!(rules[0].hit_count, 42);
        assert_eq!(rules[1].hit_count, 0);
    }

    #[test]
    fn duplicate_names_last_rule_wins() {
        let mut rules = vec![
            rule("shared-name", RuleLayer::Pre, 1),
            rule("local-only", RuleLayer::Local, 2),
            rule("shared-name", RuleLayer::Post, 3),
        ];
        join_hits(&mut rules, &[hits("shared-name", 9)]);
        assert_eq!(rules[0].hit_count, 0);
        assert_eq!(rules[2].hit_count, 9);
    }

    #[test]
    fn xpaths_are_layer_specific() {
        let pre = candidate_xpaths(RuleLayer::Pre, RulebaseKind::Security, "vsys1");
        assert!(pre.iter().all(|x| x.contains("/pre-rulebase/security/rules")));
        let local = candidate_xpaths(RuleLayer::Local, RulebaseKind::Nat, "vsys2");
        assert!(local[0].contains("entry[@name='vsys2']/rulebase/nat/rules"));
        let post = candidate_xpaths(RuleLayer::Post, RulebaseKind::Nat, "vsys1");
        assert!(post.iter().all(|x| x.contains("/post-rulebase/nat/")));
    }
}
