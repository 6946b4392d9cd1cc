//! Chat platform abstraction consumed by the task-list core.
//!
//! The [`ChatPlatform`] trait decouples mention resolution and the
//! message-backed task store from the Slack Web API so both can run
//! against an in-memory double in tests.

use std::future::Future;
use std::pin::Pin;

use crate::Result;

/// Boxed future returned by every [`ChatPlatform`] call.
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// One message from a conversation's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Message timestamp, which doubles as its identifier.
    pub ts: String,
    /// Message body, if any.
    pub text: Option<String>,
    /// Author user ID, if the message has one.
    pub user: Option<String>,
    /// Whether the message was posted by a bot integration.
    pub bot_authored: bool,
}

/// Outbound chat platform operations.
///
/// All calls are independent network operations with no transactional
/// relationship to each other.
pub trait ChatPlatform: Send + Sync {
    /// Open (or reuse) the DM conversation with `user_id`, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if the conversation
    /// cannot be opened.
    fn open_direct_conversation<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, String>;

    /// Up to `limit` most recent messages in `channel`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if history cannot be read.
    fn recent_messages<'a>(
        &'a self,
        channel: &'a str,
        limit: u16,
    ) -> PlatformFuture<'a, Vec<HistoryEntry>>;

    /// Post `text` to `channel`, returning the new message timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if the post fails.
    fn post_message<'a>(&'a self, channel: &'a str, text: &'a str) -> PlatformFuture<'a, String>;

    /// Delete the message at `ts` in `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if the delete fails.
    fn delete_message<'a>(&'a self, channel: &'a str, ts: &'a str) -> PlatformFuture<'a, ()>;

    /// Permanent link to the message at `ts` in `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if the lookup fails.
    fn permalink<'a>(&'a self, channel: &'a str, ts: &'a str) -> PlatformFuture<'a, String>;

    /// Human-facing name for `user_id`, or `None` when the profile has none.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if the lookup fails.
    fn display_name<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, Option<String>>;

    /// Member user IDs of the user group `group_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if the lookup fails.
    fn group_members<'a>(&'a self, group_id: &'a str) -> PlatformFuture<'a, Vec<String>>;
}
