//! Task lists stored as messages in each recipient's DM with the bot.
//!
//! There is no database. A recipient's current list is the newest
//! bot-authored message in their DM that carries a record marker. Writing
//! posts a fresh record and then deletes the previous one. The two calls are
//! not atomic: a failed post leaves the old record authoritative, a failed
//! delete leaves a stale duplicate behind that the next read skips because
//! it is older.

use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::models::task::TaskList;
use crate::persistence::locks::RecipientLocks;
use crate::persistence::record_codec::{self, RecordKind};
use crate::slack::platform::{ChatPlatform, HistoryEntry};
use crate::Result;

/// A recipient's task list as read from their DM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListSnapshot {
    /// DM conversation ID.
    pub channel: String,
    /// Timestamp of the live record, `None` when none was found.
    pub record_ts: Option<String>,
    /// Kind of the live record, `None` when none was found.
    pub kind: Option<RecordKind>,
    /// Decoded tasks, oldest first.
    pub tasks: TaskList,
}

/// Repository for message-backed task lists.
#[derive(Clone)]
pub struct TaskListRepo {
    platform: Arc<dyn ChatPlatform>,
    history_limit: u16,
    bot_user_id: Option<String>,
    locks: RecipientLocks,
}

impl TaskListRepo {
    /// Create a repository that scans `history_limit` messages per read.
    #[must_use]
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        history_limit: u16,
        bot_user_id: Option<String>,
    ) -> Self {
        Self {
            platform,
            history_limit,
            bot_user_id,
            locks: RecipientLocks::default(),
        }
    }

    /// Serialize access to `recipient`'s list for one get/commit cycle.
    pub async fn lock(&self, recipient: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(recipient).await
    }

    /// Per-recipient lock table.
    #[must_use]
    pub fn locks(&self) -> &RecipientLocks {
        &self.locks
    }

    /// Read `recipient`'s current list.
    ///
    /// Only the newest `history_limit` messages are scanned; a record older
    /// than that window is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the DM cannot be opened or its history
    /// cannot be read.
    pub async fn get(&self, recipient: &str) -> Result<TaskListSnapshot> {
        let channel = self.platform.open_direct_conversation(recipient).await?;
        let history = self
            .platform
            .recent_messages(&channel, self.history_limit)
            .await?;

        let live = history.iter().find_map(|entry| {
            if !self.is_bot_authored(entry) {
                return None;
            }
            let body = entry.text.as_deref()?;
            record_codec::decode_record(body).map(|(kind, tasks)| (entry.ts.clone(), kind, tasks))
        });

        let snapshot = match live {
            Some((ts, kind, tasks)) => TaskListSnapshot {
                channel,
                record_ts: Some(ts),
                kind: Some(kind),
                tasks,
            },
            None => TaskListSnapshot {
                channel,
                record_ts: None,
                kind: None,
                tasks: Vec::new(),
            },
        };

        debug!(
            recipient,
            channel = %snapshot.channel,
            record_ts = ?snapshot.record_ts,
            count = snapshot.tasks.len(),
            "read task list"
        );
        Ok(snapshot)
    }

    /// Replace the live record in `channel` with one encoding `tasks`.
    ///
    /// Posts first; only after a successful post is `prior_ts` deleted.
    /// A delete failure is logged and otherwise ignored. Returns the new
    /// record's timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the new record cannot be posted, in
    /// which case the prior record is left untouched.
    pub async fn commit(
        &self,
        channel: &str,
        tasks: &[String],
        prior_ts: Option<&str>,
        removed: Option<&str>,
    ) -> Result<String> {
        let body = record_codec::encode(tasks, removed);
        let new_ts = self.platform.post_message(channel, &body).await?;
        info!(channel, ts = %new_ts, count = tasks.len(), "posted task list");

        if let Some(old_ts) = prior_ts {
            match self.platform.delete_message(channel, old_ts).await {
                Ok(()) => info!(channel, ts = old_ts, "retired previous task list"),
                Err(err) => warn!(channel, ts = old_ts, %err, "failed to delete previous task list"),
            }
        }

        Ok(new_ts)
    }

    /// Post an informational message that is not a task record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the post fails.
    pub async fn notify(&self, channel: &str, text: &str) -> Result<()> {
        self.platform.post_message(channel, text).await?;
        Ok(())
    }

    fn is_bot_authored(&self, entry: &HistoryEntry) -> bool {
        entry.bot_authored
            || (self.bot_user_id.is_some() && entry.user.as_deref() == self.bot_user_id.as_deref())
    }
}
