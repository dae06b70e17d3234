// ── Schema-fallback parsing ──
//
// The same logical object is encoded differently across device families and
// firmware trains. Each domain lists its candidate wire shapes as ordered
// `Strategy` values; `extract` runs them against the wrapped payload and keeps
// the first one that yields valid records. Nothing here returns an error: an
// unparseable payload and an empty one both produce an empty `Vec`.

pub(crate) mod device;
pub(crate) mod log;
pub(crate) mod network;
pub(crate) mod policy;
pub(crate) mod session;
pub(crate) mod system;
pub(crate) mod time;
pub(crate) mod xml;

use roxmltree::{Document, Node};
use serde_json::Value;
use tracing::{debug, trace};

use panfly_api::wrap_fragment;

/// A record that can be built from one located XML element.
pub(crate) trait Record: Sized {
    fn from_node(node: Node<'_, '_>) -> Self;

    /// Minimal structural check; invalid records are dropped.
    fn is_valid(&self) -> bool;
}

/// Where a strategy finds its entries.
pub(crate) enum Locator<T> {
    /// Element path below the synthetic root. `*` matches any element name.
    /// An empty path selects the root itself.
    Path(&'static [&'static str]),
    /// Leaf elements whose text is a JSON document, with a decoder.
    Json(&'static [&'static str], fn(&Value) -> Vec<T>),
}

pub(crate) struct Strategy<T> {
    pub label: &'static str,
    pub locator: Locator<T>,
}

impl<T> Strategy<T> {
    pub(crate) const fn path(label: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            label,
            locator: Locator::Path(path),
        }
    }

    pub(crate) const fn json(
        label: &'static str,
        leaf: &'static [&'static str],
        decode: fn(&Value) -> Vec<T>,
    ) -> Self {
        Self {
            label,
            locator: Locator::Json(leaf, decode),
        }
    }
}

/// Run `strategies` in order against an un-rooted payload.
pub(crate) fn extract<T: Record>(payload: &str, strategies: &[Strategy<T>]) -> Vec<T> {
    let wrapped = wrap_fragment(payload);
    let doc = match Document::parse(&wrapped) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "payload is not well-formed XML, treating as empty");
            return Vec::new();
        }
    };
    extract_from(doc.root_element(), strategies)
}

/// Like [`extract`], for callers that already hold a parsed document.
pub(crate) fn extract_from<T: Record>(root: Node<'_, '_>, strategies: &[Strategy<T>]) -> Vec<T> {
    for strategy in strategies {
        let records: Vec<T> = match &strategy.locator {
            Locator::Path(path) => select(root, path)
                .into_iter()
                .map(T::from_node)
                .filter(T::is_valid)
                .collect(),
            Locator::Json(leaf, decode) => select(root, leaf)
                .into_iter()
                .filter_map(|node| serde_json::from_str::<Value>(&xml::text_of(node)).ok())
                .flat_map(|value| decode(&value))
                .filter(T::is_valid)
                .collect(),
        };
        if !records.is_empty() {
            trace!(strategy = strategy.label, count = records.len(), "strategy matched");
            return records;
        }
    }
    Vec::new()
}

/// Elements reached by walking `path` down from `root`.
pub(crate) fn select<'a, 'input>(root: Node<'a, 'input>, path: &[&str]) -> Vec<Node<'a, 'input>> {
    let mut current = vec![root];
    for segment in path {
        current = current
            .iter()
            .flat_map(|node| node.children())
            .filter(|child| {
                child.is_element() && (*segment == "*" || child.tag_name().name() == *segment)
            })
            .collect();
    }
    current
}

/// Whole-payload text, for payloads that are CDATA or plain text.
pub(crate) fn payload_text(payload: &str) -> String {
    let wrapped = wrap_fragment(payload);
    match Document::parse(&wrapped) {
        Ok(doc) => doc
            .root_element()
            .descendants()
            .filter(Node::is_text)
            .filter_map(|n| n.text())
            .collect(),
        Err(_) => payload.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::xml::Fields;

    #[derive(Debug, PartialEq)]
    struct Named(String);

    impl Record for Named {
        fn from_node(node: Node<'_, '_>) -> Self {
            Named(Fields::new(node).text(&["name"]))
        }

        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    fn decode_names(value: &Value) -> Vec<Named> {
        value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(|s| Named(s.to_owned()))
            .collect()
    }

    const STRATEGIES: &[Strategy<Named>] = &[
        Strategy::path("flat", &["entry"]),
        Strategy::path("wrapped", &["*", "entry"]),
        Strategy::json("json", &["json"], decode_names),
    ];

    #[test]
    fn first_valid_strategy_wins() {
        let flat = extract("<entry name=\"a\"/><entry><name>b</name></entry>", STRATEGIES);
        assert_eq!(flat, vec![Named("a".into()), Named("b".into())]);

        let wrapped = extract("<dp0><entry name=\"a\"/></dp0>", STRATEGIES);
        assert_eq!(wrapped, vec![Named("a".into())]);
    }

    #[test]
    fn invalid_entries_fall_through_to_next_strategy() {
        let out = extract("<entry/><list><entry name=\"x\"/></list>", STRATEGIES);
        assert_eq!(out, vec![Named("x".into())]);
    }

    #[test]
    fn json_leaf() {
        let out = extract("<json>[\"r1\", \"r2\"]</json>", STRATEGIES);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn garbage_is_empty_not_error() {
        assert!(extract("<entry name=", STRATEGIES).is_empty());
        assert!(extract("", STRATEGIES).is_empty());
        assert!(extract("plain text", STRATEGIES).is_empty());
        assert!(extract("<json>{not json</json>", STRATEGIES).is_empty());
    }

    #[test]
    fn cdata_text() {
        assert_eq!(payload_text("<![CDATA[top - 10:00]]>"), "top - 10:00");
    }
}
