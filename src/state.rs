//! Shared application state handed to every webhook request.

use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::mentions::resolver::RecipientResolver;
use crate::persistence::task_list_repo::TaskListRepo;
use crate::slack::platform::ChatPlatform;

/// State shared by all request handlers.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Outbound chat platform.
    pub platform: Arc<dyn ChatPlatform>,
    /// Allow-list bound mention resolver.
    pub resolver: RecipientResolver,
    /// Message-backed task-list store.
    pub tasks: TaskListRepo,
}

impl AppState {
    /// Wire the resolver and task store to `platform` using `config`.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>, platform: Arc<dyn ChatPlatform>) -> Self {
        let resolver = RecipientResolver::new(config.allow_list(), Arc::clone(&platform));
        let tasks = TaskListRepo::new(
            Arc::clone(&platform),
            config.history_limit,
            config.slack.bot_user_id.clone(),
        );
        Self {
            config,
            platform,
            resolver,
            tasks,
        }
    }
}
