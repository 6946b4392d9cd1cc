//! Remove a task from the requesting user's own list.

use tracing::info;

use crate::state::AppState;
use crate::Result;

/// Notice posted when the list is already empty.
pub const NOTHING_TO_REMOVE: &str = "No tasks to remove.";

/// Result of a removal command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The task was removed and a new record committed.
    Removed(String),
    /// The list was empty; a notice was posted.
    NothingToRemove,
    /// The position was outside `1..=len`; a notice was posted.
    OutOfRange,
}

/// Remove the task at 1-based position `requested` (decimal digits as
/// typed) from `user_id`'s list.
///
/// Positions are derived from current order, so after a removal the
/// remaining tasks renumber from 1.
///
/// # Errors
///
/// Returns `AppError::Slack` if the DM cannot be opened or read, or if the
/// new record or notice cannot be posted.
pub async fn handle_removal(
    user_id: &str,
    requested: &str,
    state: &AppState,
) -> Result<RemovalOutcome> {
    let _guard = state.tasks.lock(user_id).await;
    let mut snapshot = state.tasks.get(user_id).await?;

    if snapshot.tasks.is_empty() {
        state
            .tasks
            .notify(&snapshot.channel, NOTHING_TO_REMOVE)
            .await?;
        return Ok(RemovalOutcome::NothingToRemove);
    }

    let len = snapshot.tasks.len();
    let Some(position) = requested
        .parse::<usize>()
        .ok()
        .filter(|position| (1..=len).contains(position))
    else {
        info!(user_id, requested, len, "removal position out of range");
        state
            .tasks
            .notify(&snapshot.channel, &out_of_range_notice(requested))
            .await?;
        return Ok(RemovalOutcome::OutOfRange);
    };

    let removed = snapshot.tasks.remove(position - 1);
    state
        .tasks
        .commit(
            &snapshot.channel,
            &snapshot.tasks,
            snapshot.record_ts.as_deref(),
            Some(&removed),
        )
        .await?;

    info!(user_id, position, remaining = snapshot.tasks.len(), "task removed");
    Ok(RemovalOutcome::Removed(removed))
}

/// Notice posted when the requested position does not exist.
#[must_use]
pub fn out_of_range_notice(requested: &str) -> String {
    format!("Task {requested} does not exist.")
}
