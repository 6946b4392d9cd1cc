//! Global configuration parsing, validation, and credential loading.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service under which the bot token may be stored.
const KEYRING_SERVICE: &str = "mention-tasks";

/// Slack API settings.
///
/// The bot token is loaded at runtime via OS keychain or environment
/// variable, never from the TOML config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// The bot's own user ID. Events and history authored by it are
    /// recognized as self-authored.
    #[serde(default)]
    pub bot_user_id: Option<String>,
    /// Bot user token used for Web API calls (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

fn default_http_port() -> u16 {
    8000
}

fn default_bind_address() -> String {
    "0.0.0.0".into()
}

fn default_history_limit() -> u16 {
    50
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Slack user IDs permitted to receive task assignments.
    pub allowed_user_ids: Vec<String>,
    /// Port for the webhook listener.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Interface address for the webhook listener.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// How many recent DM messages are scanned for the live task record.
    #[serde(default = "default_history_limit")]
    pub history_limit: u16,
    /// Slack connectivity settings.
    #[serde(default)]
    pub slack: SlackConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the Slack bot token from OS keychain with env-var fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides the token.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?;
        Ok(())
    }

    /// The allow-list as a set, for handing to the recipient resolver.
    #[must_use]
    pub fn allow_list(&self) -> HashSet<String> {
        self.allowed_user_ids.iter().cloned().collect()
    }

    fn validate(&self) -> Result<()> {
        if self.allowed_user_ids.is_empty() {
            return Err(AppError::Config(
                "allowed_user_ids must not be empty".into(),
            ));
        }

        if self.allowed_user_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(AppError::Config(
                "allowed_user_ids must not contain blank entries".into(),
            ));
        }

        if !(1..=999).contains(&self.history_limit) {
            return Err(AppError::Config(
                "history_limit must be between 1 and 999".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain service {KEYRING_SERVICE} or {env_key} env var"
        ))),
    }
}
