//! Inbound Events API envelope and message event payloads.

use serde::Deserialize;

/// Conversation-type tag Slack uses for direct messages.
pub const DIRECT_CHANNEL_TYPE: &str = "im";

/// Outer body of every request Slack sends to the webhook.
///
/// Carries either a `url_verification` challenge or an `event_callback`
/// wrapping a single event.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EventEnvelope {
    /// Envelope kind (`url_verification`, `event_callback`).
    #[serde(rename = "type", default)]
    pub envelope_type: Option<String>,
    /// Verification token to echo back.
    #[serde(default)]
    pub challenge: Option<String>,
    /// Slack-assigned delivery identifier, stable across retries.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Wrapped event, absent for verification requests.
    #[serde(default)]
    pub event: Option<MessageEvent>,
}

/// A single event inside an `event_callback` envelope.
///
/// Only the fields this service reads are modeled; everything else in the
/// payload is ignored during deserialization.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MessageEvent {
    /// Event type, `message` for plain posts.
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Message subtype (`message_changed`, `bot_message`, ...).
    #[serde(default)]
    pub subtype: Option<String>,
    /// Message body.
    #[serde(default)]
    pub text: Option<String>,
    /// Conversation the message was posted in.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp.
    #[serde(default)]
    pub ts: Option<String>,
    /// Thread parent timestamp when posted inside a thread.
    #[serde(default)]
    pub thread_ts: Option<String>,
    /// Author user ID.
    #[serde(default)]
    pub user: Option<String>,
    /// Present when the message was posted by a bot integration.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Conversation type (`im`, `channel`, `group`, `mpim`).
    #[serde(default)]
    pub channel_type: Option<String>,
    /// Block Kit content, consulted when `text` is empty.
    #[serde(default)]
    pub blocks: Vec<serde_json::Value>,
}

impl MessageEvent {
    /// Whether the message was posted in a one-to-one DM.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.channel_type.as_deref() == Some(DIRECT_CHANNEL_TYPE)
    }

    /// Timestamp a permalink should point at: the thread parent when the
    /// message is a reply, otherwise the message itself.
    #[must_use]
    pub fn link_ts(&self) -> Option<&str> {
        self.thread_ts.as_deref().or(self.ts.as_deref())
    }
}
