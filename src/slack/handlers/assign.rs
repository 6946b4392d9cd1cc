//! Append a task to a recipient's list.

use tracing::info;

use crate::mentions::resolver::Assignment;
use crate::models::task::{compose_task, visible_body};
use crate::slack::handlers::TaskOrigin;
use crate::state::AppState;
use crate::Result;

/// Build the task for `assignment` from `message_text` and commit it to the
/// end of the recipient's list. Returns the new record's timestamp.
///
/// # Errors
///
/// Returns `AppError::Slack` if the recipient's DM cannot be opened or read,
/// or if the new record cannot be posted.
pub async fn handle_assignment(
    assignment: &Assignment,
    message_text: &str,
    origin: &TaskOrigin,
    state: &AppState,
) -> Result<String> {
    let body = visible_body(message_text, &assignment.mention.raw);
    let task = compose_task(&body, &origin.sender_name, &origin.permalink);
    let recipient = assignment.recipient.as_str();

    let _guard = state.tasks.lock(recipient).await;
    let mut snapshot = state.tasks.get(recipient).await?;
    snapshot.tasks.push(task);

    let ts = state
        .tasks
        .commit(
            &snapshot.channel,
            &snapshot.tasks,
            snapshot.record_ts.as_deref(),
            None,
        )
        .await?;

    info!(recipient, count = snapshot.tasks.len(), "task assigned");
    Ok(ts)
}
