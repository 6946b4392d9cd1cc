//! Shared test helpers for handler-level integration tests.
//!
//! Provides an in-memory [`ChatPlatform`] that keeps per-conversation
//! history, records every post and delete, and can be told to fail
//! individual operations, plus `AppState` construction on top of it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use mention_tasks::config::GlobalConfig;
use mention_tasks::slack::platform::{ChatPlatform, HistoryEntry, PlatformFuture};
use mention_tasks::state::AppState;
use mention_tasks::AppError;

/// Bot user ID used by every test config.
pub const BOT_USER: &str = "U_BOT";

#[derive(Default)]
struct FakeState {
    /// Oldest first.
    history: HashMap<String, Vec<HistoryEntry>>,
    next_ts: u64,
    posts: Vec<(String, String)>,
    deletes: Vec<(String, String)>,
    names: HashMap<String, String>,
    groups: HashMap<String, Vec<String>>,
    unreachable_users: HashSet<String>,
    fail_history: bool,
    fail_post: bool,
    fail_delete: bool,
    fail_lookups: bool,
}

impl FakeState {
    fn next_ts(&mut self) -> String {
        self.next_ts += 1;
        format!("1700000000.{:06}", self.next_ts)
    }
}

/// In-memory Slack stand-in.
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut guard = self.state.lock().expect("fake state lock");
        f(&mut guard)
    }

    /// DM conversation ID the fake assigns to `user`.
    pub fn dm_channel(user: &str) -> String {
        format!("D_{user}")
    }

    pub fn set_display_name(&self, user: &str, name: &str) {
        self.with_state(|s| s.names.insert(user.to_owned(), name.to_owned()));
    }

    pub fn set_group(&self, group: &str, members: &[&str]) {
        self.with_state(|s| {
            s.groups.insert(
                group.to_owned(),
                members.iter().map(|m| (*m).to_owned()).collect(),
            )
        });
    }

    pub fn make_unreachable(&self, user: &str) {
        self.with_state(|s| s.unreachable_users.insert(user.to_owned()));
    }

    pub fn fail_history(&self, fail: bool) {
        self.with_state(|s| s.fail_history = fail);
    }

    pub fn fail_post(&self, fail: bool) {
        self.with_state(|s| s.fail_post = fail);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.with_state(|s| s.fail_delete = fail);
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.with_state(|s| s.fail_lookups = fail);
    }

    /// Append a message to `channel` directly, returning its ts.
    pub fn seed(&self, channel: &str, text: &str, bot_authored: bool) -> String {
        self.with_state(|s| {
            let ts = s.next_ts();
            s.history.entry(channel.to_owned()).or_default().push(HistoryEntry {
                ts: ts.clone(),
                text: Some(text.to_owned()),
                user: Some(if bot_authored { BOT_USER } else { "U_HUMAN" }.to_owned()),
                bot_authored,
            });
            ts
        })
    }

    /// Texts of the messages still present in `channel`, oldest first.
    pub fn messages(&self, channel: &str) -> Vec<String> {
        self.with_state(|s| {
            s.history
                .get(channel)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| entry.text.clone())
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Every `(channel, text)` posted through the platform.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.with_state(|s| s.posts.clone())
    }

    /// Every `(channel, ts)` deleted through the platform.
    pub fn deletes(&self) -> Vec<(String, String)> {
        self.with_state(|s| s.deletes.clone())
    }

    pub fn permalink_for(channel: &str, ts: &str) -> String {
        format!("https://slack.test/archives/{channel}/p{}", ts.replace('.', ""))
    }
}

impl ChatPlatform for FakePlatform {
    fn open_direct_conversation<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, String> {
        Box::pin(async move {
            let unreachable = self.with_state(|s| s.unreachable_users.contains(user_id));
            if unreachable {
                return Err(AppError::Slack("cannot_dm_bot".into()));
            }
            Ok(Self::dm_channel(user_id))
        })
    }

    fn recent_messages<'a>(
        &'a self,
        channel: &'a str,
        limit: u16,
    ) -> PlatformFuture<'a, Vec<HistoryEntry>> {
        Box::pin(async move {
            let result = self.with_state(|s| {
                if s.fail_history {
                    return Err(AppError::Slack("ratelimited".into()));
                }
                Ok(s.history
                    .get(channel)
                    .map(|entries| {
                        entries
                            .iter()
                            .rev()
                            .take(usize::from(limit))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default())
            });
            // Give concurrent handlers a chance to interleave between read and write.
            tokio::task::yield_now().await;
            result
        })
    }

    fn post_message<'a>(&'a self, channel: &'a str, text: &'a str) -> PlatformFuture<'a, String> {
        Box::pin(async move {
            self.with_state(|s| {
                if s.fail_post {
                    return Err(AppError::Slack("channel_not_found".into()));
                }
                let ts = s.next_ts();
                s.history.entry(channel.to_owned()).or_default().push(HistoryEntry {
                    ts: ts.clone(),
                    text: Some(text.to_owned()),
                    user: Some(BOT_USER.to_owned()),
                    bot_authored: true,
                });
                s.posts.push((channel.to_owned(), text.to_owned()));
                Ok(ts)
            })
        })
    }

    fn delete_message<'a>(&'a self, channel: &'a str, ts: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.with_state(|s| {
                if s.fail_delete {
                    return Err(AppError::Slack("cant_delete_message".into()));
                }
                let entries = s.history.entry(channel.to_owned()).or_default();
                let before = entries.len();
                entries.retain(|entry| entry.ts != ts);
                if entries.len() == before {
                    return Err(AppError::Slack("message_not_found".into()));
                }
                s.deletes.push((channel.to_owned(), ts.to_owned()));
                Ok(())
            })
        })
    }

    fn permalink<'a>(&'a self, channel: &'a str, ts: &'a str) -> PlatformFuture<'a, String> {
        Box::pin(async move {
            if self.with_state(|s| s.fail_lookups) {
                return Err(AppError::Slack("message_not_found".into()));
            }
            Ok(Self::permalink_for(channel, ts))
        })
    }

    fn display_name<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, Option<String>> {
        Box::pin(async move {
            self.with_state(|s| {
                if s.fail_lookups {
                    return Err(AppError::Slack("user_not_found".into()));
                }
                Ok(s.names.get(user_id).cloned())
            })
        })
    }

    fn group_members<'a>(&'a self, group_id: &'a str) -> PlatformFuture<'a, Vec<String>> {
        Box::pin(async move {
            self.with_state(|s| {
                if s.fail_lookups {
                    return Err(AppError::Slack("no_such_subteam".into()));
                }
                s.groups
                    .get(group_id)
                    .cloned()
                    .ok_or_else(|| AppError::Slack("no_such_subteam".into()))
            })
        })
    }
}

/// Build a `GlobalConfig` with the given allow-list and history window.
pub fn test_config(allowed: &[&str], history_limit: u16) -> GlobalConfig {
    let ids = allowed
        .iter()
        .map(|id| format!("\"{id}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let toml = format!(
        r#"
allowed_user_ids = [{ids}]
http_port = 0
bind_address = "127.0.0.1"
history_limit = {history_limit}

[slack]
bot_user_id = "{BOT_USER}"
"#
    );
    GlobalConfig::from_toml_str(&toml).expect("valid test config")
}

/// Build an `AppState` over `platform` allowing `allowed`.
pub fn test_state(allowed: &[&str], platform: &Arc<FakePlatform>) -> Arc<AppState> {
    test_state_with_limit(allowed, 50, platform)
}

/// Build an `AppState` with an explicit history window.
pub fn test_state_with_limit(
    allowed: &[&str],
    history_limit: u16,
    platform: &Arc<FakePlatform>,
) -> Arc<AppState> {
    let config = Arc::new(test_config(allowed, history_limit));
    let platform: Arc<dyn ChatPlatform> = Arc::clone(platform) as Arc<dyn ChatPlatform>;
    Arc::new(AppState::new(config, platform))
}

/// Build an `event_callback` message envelope.
pub fn message_envelope(
    text: &str,
    channel: &str,
    channel_type: &str,
    user: &str,
    ts: &str,
) -> serde_json::Value {
    serde_json::json!({
        "type": "event_callback",
        "event_id": format!("Ev{ts}"),
        "event": {
            "type": "message",
            "text": text,
            "channel": channel,
            "channel_type": channel_type,
            "user": user,
            "ts": ts,
        }
    })
}
