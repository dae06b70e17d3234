// Response envelope
//
// Every reply is wrapped as
//   <response status="success|error" code="N"><result>...</result><msg>...</msg></response>
// The content of <result> is kept as a raw, un-rooted XML fragment: it can
// hold several sibling elements, CDATA, or plain text depending on the query.

use std::fmt;

use tracing::trace;

use crate::error::Error;

/// Element name used to wrap un-rooted payload fragments before parsing.
pub const PAYLOAD_ROOT: &str = "panfly-payload";

const SUCCESS_TOKEN: &str = "success";
const ERROR_TOKEN: &str = "error";

/// The envelope's status discriminant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    /// Any other token (including a missing attribute, kept as `""`).
    Other(String),
}

impl Status {
    fn from_token(token: &str) -> Self {
        match token {
            SUCCESS_TOKEN => Self::Success,
            ERROR_TOKEN => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => SUCCESS_TOKEN,
            Self::Error => ERROR_TOKEN,
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded outer envelope of one response.
///
/// Created once per transport call and handed straight to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub status: Status,
    pub code: Option<String>,
    /// Raw inner XML of `<result>`; empty when the element is absent.
    pub payload: String,
    pub message: Option<String>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// The embedded message, or a generic `status=… code=…` description.
    pub fn error_message(&self) -> String {
        match &self.message {
            Some(msg) if !msg.is_empty() => msg.clone(),
            _ => format!(
                "status={} code={}",
                self.status,
                self.code.as_deref().unwrap_or("-")
            ),
        }
    }

    /// The payload wrapped in a synthetic root, ready for a DOM parser.
    pub fn wrapped_payload(&self) -> String {
        wrap_fragment(&self.payload)
    }

    /// Parse the outer `<response>` document.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let doc = roxmltree::Document::parse(body).map_err(|e| envelope_error(&e, body))?;
        let root = doc.root_element();
        if root.tag_name().name() != "response" {
            return Err(Error::Envelope {
                message: format!("expected <response>, found <{}>", root.tag_name().name()),
                body: body.to_owned(),
            });
        }

        let status = Status::from_token(root.attribute("status").unwrap_or_default());
        let code = root
            .attribute("code")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);

        let result = root
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "result");

        let payload = result
            .and_then(|node| body.get(node.range()))
            .map(inner_xml)
            .unwrap_or_default()
            .to_owned();

        // <msg> may sit directly under <response> or inside <result>.
        let message = root
            .children()
            .chain(result.into_iter().flat_map(|r| r.children()))
            .find(|n| n.is_element() && n.tag_name().name() == "msg")
            .map(message_text)
            .filter(|m| !m.is_empty());

        trace!(%status, payload_len = payload.len(), "decoded envelope");

        Ok(Self {
            status,
            code,
            payload,
            message,
        })
    }

    /// Keep successful envelopes; turn everything else into a protocol error.
    pub(crate) fn require_success(self) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self.error_message();
        if matches!(self.code.as_deref(), Some("401" | "403")) {
            return Err(Error::Authentication { message });
        }
        Err(Error::Api {
            status: self.status.as_str().to_owned(),
            code: self.code,
            message,
        })
    }
}

/// Wrap an un-rooted fragment in [`PAYLOAD_ROOT`].
pub fn wrap_fragment(fragment: &str) -> String {
    format!("<{PAYLOAD_ROOT}>{fragment}</{PAYLOAD_ROOT}>")
}

fn envelope_error(err: &roxmltree::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Envelope {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

/// Text of a `<msg>` element. Multi-line messages (`<line>` children) are
/// joined with `"; "`.
fn message_text(msg: roxmltree::Node<'_, '_>) -> String {
    let lines: Vec<String> = msg
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "line")
        .map(collect_text)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        collect_text(msg)
    } else {
        lines.join("; ")
    }
}

fn collect_text(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(roxmltree::Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Strip the outer start/end tags from a serialized element.
///
/// Self-closing elements yield an empty string.
fn inner_xml(raw: &str) -> &str {
    let mut quote: Option<u8> = None;
    let mut open_end = None;
    for (i, b) in raw.bytes().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                open_end = Some(i);
                break;
            }
            None => {}
        }
    }
    let Some(end) = open_end else {
        return "";
    };
    if end > 0 && raw.as_bytes().get(end - 1) == Some(&b'/') {
        return "";
    }
    let rest = raw.get(end + 1..).unwrap_or_default();
    rest.rfind("</").and_then(|close| rest.get(..close)).unwrap_or_default()
}
