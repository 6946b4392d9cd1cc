//! Expansion of mentions into allow-listed task recipients.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::mentions::parser::{MentionKind, MentionToken};
use crate::slack::platform::ChatPlatform;

/// One task to create: `recipient` was reached through `mention`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// User who receives the task.
    pub recipient: String,
    /// Mention that produced this assignment.
    pub mention: MentionToken,
}

/// Resolves mention tokens to recipients permitted by the allow-list.
pub struct RecipientResolver {
    allow_list: HashSet<String>,
    platform: Arc<dyn ChatPlatform>,
}

impl RecipientResolver {
    /// Create a resolver bound to a fixed allow-list.
    #[must_use]
    pub fn new(allow_list: HashSet<String>, platform: Arc<dyn ChatPlatform>) -> Self {
        Self {
            allow_list,
            platform,
        }
    }

    /// Whether `user_id` may receive tasks.
    #[must_use]
    pub fn is_allowed(&self, user_id: &str) -> bool {
        self.allow_list.contains(user_id)
    }

    /// Expand `mentions` into assignments, in mention order.
    ///
    /// Duplicates are kept: a user mentioned twice, or reached through two
    /// groups, gets one assignment per path. A failed group lookup counts
    /// as an empty group.
    pub async fn resolve(&self, mentions: &[MentionToken]) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        for mention in mentions {
            let candidates = match mention.kind {
                MentionKind::User => vec![mention.id.clone()],
                MentionKind::Group => self.group_members(&mention.id).await,
            };

            for candidate in candidates {
                if self.is_allowed(&candidate) {
                    assignments.push(Assignment {
                        recipient: candidate,
                        mention: mention.clone(),
                    });
                } else {
                    debug!(user_id = %candidate, "mentioned user not on allow-list");
                }
            }
        }
        assignments
    }

    async fn group_members(&self, group_id: &str) -> Vec<String> {
        match self.platform.group_members(group_id).await {
            Ok(members) => {
                debug!(group_id, count = members.len(), "expanded user group");
                members
            }
            Err(err) => {
                warn!(group_id, %err, "user group lookup failed; treating as empty");
                Vec::new()
            }
        }
    }
}
