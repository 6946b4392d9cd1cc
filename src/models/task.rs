//! Task text composition.
//!
//! A task is an opaque display string of the form
//! `{body} (from {sender}) - {permalink}`. Once composed it is never edited,
//! only removed from its list.

/// Maximum body length, in characters, kept before truncation.
pub const MAX_BODY_CHARS: usize = 200;

/// Marker appended to a truncated body.
pub const ELLIPSIS: &str = "...";

/// Ordered task list for one recipient, oldest first.
pub type TaskList = Vec<String>;

/// Message text with the triggering mention removed, whitespace collapsed,
/// and length capped at [`MAX_BODY_CHARS`].
///
/// Collapsing newlines keeps every task on a single numbered line when the
/// list is encoded.
#[must_use]
pub fn visible_body(message_text: &str, mention_token: &str) -> String {
    let stripped = if mention_token.is_empty() {
        message_text.to_owned()
    } else {
        message_text.replace(mention_token, "")
    };
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_body(&collapsed)
}

/// Cap `body` at [`MAX_BODY_CHARS`] characters, appending [`ELLIPSIS`] when
/// anything was cut.
#[must_use]
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &body[..cut]),
        None => body.to_owned(),
    }
}

/// Assemble the display string stored in a task list.
#[must_use]
pub fn compose_task(body: &str, sender_name: &str, permalink: &str) -> String {
    if body.is_empty() {
        format!("(from {sender_name}) - {permalink}")
    } else {
        format!("{body} (from {sender_name}) - {permalink}")
    }
}
