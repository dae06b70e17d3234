// ── Session filter expressions ──
//
// `from=trust application=ssl destination-port=443` becomes
// `<filter><from>trust</from>...</filter>` inside `show session all`.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::CoreError;

/// Filter keys the session table accepts, with short aliases.
const KEYS: &[(&str, &[&str])] = &[
    ("from", &["from-zone"]),
    ("to", &["to-zone"]),
    ("source", &["src"]),
    ("destination", &["dst"]),
    ("source-port", &["sport"]),
    ("destination-port", &["dport"]),
    ("source-user", &["user"]),
    ("protocol", &["proto"]),
    ("application", &["app"]),
    ("rule", &[]),
    ("nat", &[]),
    ("state", &[]),
    ("type", &[]),
    ("vsys-name", &["vsys"]),
    ("count", &[]),
];

/// Parsed session filter. Empty means "all sessions".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    terms: Vec<(&'static str, String)>,
}

impl SessionFilter {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `<filter>...</filter>`, or an empty string for no filter.
    pub fn to_xml(&self) -> String {
        if self.terms.is_empty() {
            return String::new();
        }
        let mut out = String::from("<filter>");
        for (key, value) in &self.terms {
            let _ = write!(out, "<{key}>{}</{key}>", escape(value));
        }
        out.push_str("</filter>");
        out
    }

    /// The full operational command.
    pub fn command(&self) -> String {
        format!("<show><session><all>{}</all></session></show>", self.to_xml())
    }
}

impl FromStr for SessionFilter {
    type Err = CoreError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let mut terms = Vec::new();
        for token in expr
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let Some((raw_key, value)) = token.split_once('=') else {
                return Err(CoreError::ValidationFailed {
                    message: format!("session filter term '{token}' is not key=value"),
                });
            };
            let key = canonical_key(raw_key.trim()).ok_or_else(|| CoreError::ValidationFailed {
                message: format!("unknown session filter key '{raw_key}'"),
            })?;
            let value = value.trim().trim_matches(['"', '\'']);
            if value.is_empty() {
                return Err(CoreError::ValidationFailed {
                    message: format!("session filter key '{key}' has no value"),
                });
            }
            terms.push((key, value.to_owned()));
        }
        Ok(Self { terms })
    }
}

fn canonical_key(raw: &str) -> Option<&'static str> {
    let raw = raw.to_ascii_lowercase();
    KEYS.iter()
        .find(|(key, aliases)| *key == raw || aliases.contains(&raw.as_str()))
        .map(|(key, _)| *key)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
