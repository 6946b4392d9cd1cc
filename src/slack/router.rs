//! Inbound event classification and dispatch.
//!
//! Every envelope resolves to exactly one [`Route`], checked in order:
//! verification challenge, ignorable event, DM removal command, mention
//! assignment. Dispatch never fails; errors are logged and the request is
//! still acknowledged so Slack does not redeliver.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::mentions::parser::{extract_text_from_blocks, parse_mentions};
use crate::models::event::{EventEnvelope, MessageEvent};
use crate::slack::handlers::{self, assign, remove};
use crate::state::AppState;

const MESSAGE_EVENT: &str = "message";

#[allow(clippy::expect_used)] // Static pattern, covered by unit tests.
static REMOVE_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^remove\s+task\s+(\d+)$").expect("removal command pattern compiles")
});

/// What an inbound envelope asks the service to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Echo the verification token; no task logic.
    Challenge(String),
    /// Acknowledge and do nothing, with the reason.
    Ignore(&'static str),
    /// Remove a task from `user`'s own list.
    Remove {
        /// Requesting user, whose list is edited.
        user: String,
        /// Position digits as typed.
        requested: String,
    },
    /// Create tasks for every allow-listed user mentioned in the message.
    Assign(Box<MessageEvent>),
}

impl Route {
    /// Short label used in tracing spans.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Challenge(_) => "challenge",
            Self::Ignore(_) => "ignore",
            Self::Remove { .. } => "remove",
            Self::Assign(_) => "assign",
        }
    }
}

/// Response the webhook sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Plain `{"ok": true}`.
    Ok,
    /// `{"challenge": ...}` for verification requests.
    Challenge(String),
}

/// Message text, falling back to Block Kit content when `text` is empty.
#[must_use]
pub fn effective_text(event: &MessageEvent) -> String {
    match event.text.as_deref() {
        Some(text) if !text.is_empty() => text.to_owned(),
        _ => {
            let text = extract_text_from_blocks(&event.blocks);
            debug!(text = %text, "reconstructed text from blocks");
            text
        }
    }
}

/// Parse a `remove task <n>` command, returning the position digits.
#[must_use]
pub fn parse_removal_command(text: &str) -> Option<String> {
    REMOVE_COMMAND
        .captures(text.trim())
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str().to_owned())
}

/// Decide which [`Route`] an envelope takes.
#[must_use]
pub fn classify(envelope: EventEnvelope, bot_user_id: Option<&str>) -> Route {
    if let Some(challenge) = envelope.challenge {
        return Route::Challenge(challenge);
    }

    let Some(event) = envelope.event else {
        return Route::Ignore("no event payload");
    };

    if event.event_type != MESSAGE_EVENT {
        return Route::Ignore("not a message event");
    }
    if event.subtype.is_some() {
        return Route::Ignore("message subtype");
    }
    if event.bot_id.is_some() {
        return Route::Ignore("bot message");
    }
    if bot_user_id.is_some() && event.user.as_deref() == bot_user_id {
        return Route::Ignore("own message");
    }

    if event.is_direct() {
        if let Some(requested) = parse_removal_command(&effective_text(&event)) {
            return match event.user {
                Some(user) if !user.is_empty() => Route::Remove { user, requested },
                _ => Route::Ignore("removal command without sender"),
            };
        }
    }

    Route::Assign(Box::new(event))
}

/// Carry out `route` against `state`.
pub async fn dispatch(route: Route, state: &AppState) -> Acknowledgement {
    match route {
        Route::Challenge(challenge) => Acknowledgement::Challenge(challenge),
        Route::Ignore(reason) => {
            debug!(reason, "ignoring event");
            Acknowledgement::Ok
        }
        Route::Remove { user, requested } => {
            info!(user_id = %user, requested = %requested, "received remove command");
            if let Err(err) = remove::handle_removal(&user, &requested, state).await {
                warn!(user_id = %user, %err, "task removal abandoned");
            }
            Acknowledgement::Ok
        }
        Route::Assign(event) => {
            assign_mentions(&event, state).await;
            Acknowledgement::Ok
        }
    }
}

async fn assign_mentions(event: &MessageEvent, state: &AppState) {
    let text = effective_text(event);
    let mentions = parse_mentions(&text);
    if mentions.is_empty() {
        debug!("no mentions in message");
        return;
    }

    let assignments = state.resolver.resolve(&mentions).await;
    if assignments.is_empty() {
        debug!(mentions = mentions.len(), "no mentioned user is allow-listed");
        return;
    }

    let origin = handlers::resolve_origin(event, state).await;
    for assignment in &assignments {
        if let Err(err) = assign::handle_assignment(assignment, &text, &origin, state).await {
            warn!(recipient = %assignment.recipient, %err, "task assignment abandoned");
        }
    }
}
