//! Mention token extraction from Slack message text.
//!
//! Slack encodes references inline: a user as `<@U123>` or `<@U123|name>`,
//! a user group as `<!subteam^S123>` or `<!subteam^S123|handle>`. Tokens
//! are whitespace-delimited and must match exactly; `<@U123>,` is not a
//! mention.

use serde_json::Value;

const USER_OPEN: &str = "<@";
const GROUP_OPEN: &str = "<!subteam^";
const CLOSE: &str = ">";

/// Whether a mention names one user or a user group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    /// `<@U…>` reference.
    User,
    /// `<!subteam^S…>` reference.
    Group,
}

/// A mention found in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionToken {
    /// User or group reference.
    pub kind: MentionKind,
    /// Identifier with any `|displayname` suffix removed.
    pub id: String,
    /// The token exactly as it appeared in the text.
    pub raw: String,
}

/// Extract every user and group mention from `text`, in order.
#[must_use]
pub fn parse_mentions(text: &str) -> Vec<MentionToken> {
    text.split_whitespace().filter_map(parse_token).collect()
}

fn parse_token(token: &str) -> Option<MentionToken> {
    let (kind, inner) = if let Some(rest) = token.strip_prefix(GROUP_OPEN) {
        (MentionKind::Group, rest.strip_suffix(CLOSE)?)
    } else if let Some(rest) = token.strip_prefix(USER_OPEN) {
        (MentionKind::User, rest.strip_suffix(CLOSE)?)
    } else {
        return None;
    };

    let id = inner.split('|').next().unwrap_or_default();
    if id.is_empty() {
        return None;
    }

    Some(MentionToken {
        kind,
        id: id.to_owned(),
        raw: token.to_owned(),
    })
}

/// Best-effort reconstruction of message text from Block Kit content.
///
/// Used only when the event's `text` field is empty. Collects, in order,
/// section text, section field text, and `text` elements (recursing into
/// nested element lists as rich-text blocks use). Rich-text `user` and
/// `usergroup` elements are rendered back into mention syntax so the
/// result can be fed to [`parse_mentions`].
#[must_use]
pub fn extract_text_from_blocks(blocks: &[Value]) -> String {
    let mut parts = Vec::new();
    for block in blocks {
        if let Some(text) = block.get("text").and_then(|t| t.get("text")).and_then(Value::as_str) {
            parts.push(text.to_owned());
        }
        if block.get("type").and_then(Value::as_str) == Some("section") {
            if let Some(fields) = block.get("fields").and_then(Value::as_array) {
                parts.extend(
                    fields
                        .iter()
                        .filter_map(|field| field.get("text").and_then(Value::as_str))
                        .map(str::to_owned),
                );
            }
        }
        if let Some(elements) = block.get("elements").and_then(Value::as_array) {
            collect_elements(elements, &mut parts);
        }
    }

    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_elements(elements: &[Value], parts: &mut Vec<String>) {
    for element in elements {
        match element.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = element.get("text").and_then(Value::as_str) {
                    parts.push(text.to_owned());
                }
            }
            Some("user") => {
                if let Some(id) = element.get("user_id").and_then(Value::as_str) {
                    parts.push(format!("{USER_OPEN}{id}{CLOSE}"));
                }
            }
            Some("usergroup") => {
                if let Some(id) = element.get("usergroup_id").and_then(Value::as_str) {
                    parts.push(format!("{GROUP_OPEN}{id}{CLOSE}"));
                }
            }
            _ => {}
        }
        if let Some(nested) = element.get("elements").and_then(Value::as_array) {
            collect_elements(nested, parts);
        }
    }
}
