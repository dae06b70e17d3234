// Field access with alias fallbacks.
//
// A field may live in a child element or an attribute, under one of several
// names depending on firmware. Aliases may be nested paths (`ha/state`).

use chrono::{DateTime, Utc};
use roxmltree::Node;

use super::time::parse_time;

#[derive(Clone, Copy)]
pub(crate) struct Fields<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> Fields<'a, 'input> {
    pub(crate) fn new(node: Node<'a, 'input>) -> Self {
        Self { node }
    }

    /// First non-empty value among `aliases`.
    pub(crate) fn opt(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| self.lookup(alias))
    }

    pub(crate) fn text(&self, aliases: &[&str]) -> String {
        self.opt(aliases).unwrap_or_default()
    }

    /// First non-zero integer among `aliases`.
    pub(crate) fn int(&self, aliases: &[&str]) -> i64 {
        aliases
            .iter()
            .filter_map(|alias| self.lookup(alias))
            .map(|raw| parse_int(&raw))
            .find(|v| *v != 0)
            .unwrap_or(0)
    }

    pub(crate) fn uint(&self, aliases: &[&str]) -> u64 {
        u64::try_from(self.int(aliases)).unwrap_or(0)
    }

    pub(crate) fn u32(&self, aliases: &[&str]) -> u32 {
        u32::try_from(self.int(aliases)).unwrap_or(0)
    }

    pub(crate) fn port(&self, aliases: &[&str]) -> u16 {
        u16::try_from(self.int(aliases)).unwrap_or(0)
    }

    /// First non-zero float among `aliases`.
    pub(crate) fn float(&self, aliases: &[&str]) -> f64 {
        aliases
            .iter()
            .filter_map(|alias| self.lookup(alias))
            .filter_map(|raw| raw.trim().trim_end_matches('%').parse::<f64>().ok())
            .find(|v| v.abs() > f64::EPSILON)
            .unwrap_or(0.0)
    }

    /// `yes`/`true`/`on`/`1`-style flags. Absent means false.
    pub(crate) fn flag(&self, aliases: &[&str]) -> bool {
        self.opt(aliases).is_some_and(|v| is_truthy(&v))
    }

    /// First alias that holds a parseable timestamp.
    pub(crate) fn time(&self, aliases: &[&str]) -> Option<DateTime<Utc>> {
        aliases
            .iter()
            .filter_map(|alias| self.lookup(alias))
            .find_map(|raw| parse_time(&raw))
    }

    /// `<alias><member>a</member><member>b</member></alias>`, or the plain
    /// text of `<alias>` as a single member.
    pub(crate) fn members(&self, alias: &str) -> Vec<String> {
        let Some(list) = child(self.node, alias) else {
            return Vec::new();
        };
        let members: Vec<String> = list
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "member")
            .map(text_of)
            .filter(|m| !m.is_empty())
            .collect();
        if members.is_empty() {
            let text = text_of(list);
            if text.is_empty() { Vec::new() } else { vec![text] }
        } else {
            members
        }
    }

    fn lookup(&self, alias: &str) -> Option<String> {
        let mut node = self.node;
        let mut segments = alias.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                node = child(node, segment)?;
                continue;
            }
            if let Some(found) = child(node, segment) {
                let text = text_of(found);
                if !text.is_empty() {
                    return Some(text);
                }
            }
            return node
                .attribute(segment)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned);
        }
        None
    }
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Concatenated, trimmed descendant text (CDATA included).
pub(crate) fn text_of(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_owned()
}

pub(crate) fn parse_int(raw: &str) -> i64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let integral = cleaned.split('.').next().unwrap_or_default();
    integral.parse().unwrap_or(0)
}

pub(crate) fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "on" | "1" | "enabled" | "up" | "connected"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const ENTRY: &str = r#"<entry name="attr-name" count="7">
        <hit-count>0</hit-count>
        <hits>42</hits>
        <disabled>yes</disabled>
        <from><member>trust</member><member>dmz</member></from>
        <service>application-default</service>
        <ha><state>active</state></ha>
        <load>1,234.5</load>
    </entry>"#;

    #[test]
    fn alias_resolution() {
        let doc = Document::parse(ENTRY).expect("valid xml");
        let f = Fields::new(doc.root_element());

        assert_eq!(f.text(&["name"]), "attr-name");
        assert_eq!(f.text(&["missing", "service"]), "application-default");
        assert_eq!(f.int(&["hit-count", "hits", "count"]), 42);
        assert_eq!(f.int(&["hit-count", "count"]), 7);
        assert_eq!(f.int(&["load"]), 1234);
        assert!(f.flag(&["disabled"]));
        assert!(!f.flag(&["negate-source"]));
        assert_eq!(f.text(&["ha/state"]), "active");
        assert_eq!(f.members("from"), vec!["trust", "dmz"]);
        assert_eq!(f.members("service"), vec!["application-default"]);
        assert!(f.members("to").is_empty());
    }
}
