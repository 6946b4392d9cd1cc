//! Task-list mutation handlers.
//!
//! Also resolves the per-message context (sender name, permalink) shared by
//! every assignment created from one message. Lookups degrade to fallback
//! values instead of failing the message.

pub mod assign;
pub mod remove;

use tracing::warn;

use crate::models::event::MessageEvent;
use crate::state::AppState;

/// Link used when a permalink cannot be resolved.
pub const FALLBACK_PERMALINK: &str = "#";

/// Sender label used when the event has no author.
pub const UNKNOWN_SENDER: &str = "someone";

/// Where a task came from, rendered into its display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOrigin {
    /// Sender's display name or a mention of their ID.
    pub sender_name: String,
    /// Link to the triggering message or its thread parent.
    pub permalink: String,
}

/// Resolve the sender name and permalink for `event`.
pub async fn resolve_origin(event: &MessageEvent, state: &AppState) -> TaskOrigin {
    TaskOrigin {
        sender_name: resolve_sender_name(event.user.as_deref(), state).await,
        permalink: resolve_permalink(event, state).await,
    }
}

async fn resolve_sender_name(user_id: Option<&str>, state: &AppState) -> String {
    let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
        return UNKNOWN_SENDER.to_owned();
    };

    match state.platform.display_name(user_id).await {
        Ok(Some(name)) => name,
        Ok(None) => format!("<@{user_id}>"),
        Err(err) => {
            warn!(user_id, %err, "display name lookup failed");
            format!("<@{user_id}>")
        }
    }
}

async fn resolve_permalink(event: &MessageEvent, state: &AppState) -> String {
    let (Some(channel), Some(ts)) = (event.channel.as_deref(), event.link_ts()) else {
        return FALLBACK_PERMALINK.to_owned();
    };

    match state.platform.permalink(channel, ts).await {
        Ok(link) => link,
        Err(err) => {
            warn!(channel, ts, %err, "permalink lookup failed");
            FALLBACK_PERMALINK.to_owned()
        }
    }
}
