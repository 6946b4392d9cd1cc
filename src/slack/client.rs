//! Slack Web API client backing the [`ChatPlatform`] trait.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackApiChatDeleteRequest, SlackApiChatGetPermalinkRequest, SlackApiChatPostMessageRequest,
    SlackApiConversationsHistoryRequest, SlackApiConversationsOpenRequest, SlackApiToken,
    SlackApiTokenType, SlackApiTokenValue, SlackApiUserGroupsUsersListRequest,
    SlackApiUsersInfoRequest, SlackChannelId, SlackClient, SlackClientHyperHttpsConnector,
    SlackClientSession, SlackMessageContent, SlackTs, SlackUserGroupId, SlackUserId,
};
use tracing::{debug, info};

use crate::slack::platform::{ChatPlatform, HistoryEntry, PlatformFuture};
use crate::{config::SlackConfig, AppError, Result};

/// Slack Web API wrapper authenticated with the bot token.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
}

impl SlackService {
    /// Build the HTTPS client and bot token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let client = Arc::new(SlackClient::new(connector));
        let bot_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.bot_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };

        info!("slack web api client ready");

        Ok(Self { client, bot_token })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ChatPlatform for SlackService {
    fn open_direct_conversation<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, String> {
        Box::pin(async move {
            let request = SlackApiConversationsOpenRequest::new()
                .with_users(vec![SlackUserId(user_id.to_owned())]);
            self.http_session()
                .conversations_open(&request)
                .await
                .map(|response| response.channel.id.0)
                .map_err(|err| AppError::Slack(format!("failed to open conversation: {err}")))
        })
    }

    fn recent_messages<'a>(
        &'a self,
        channel: &'a str,
        limit: u16,
    ) -> PlatformFuture<'a, Vec<HistoryEntry>> {
        Box::pin(async move {
            let request = SlackApiConversationsHistoryRequest::new()
                .with_channel(SlackChannelId(channel.to_owned()))
                .with_limit(limit);
            let response = self
                .http_session()
                .conversations_history(&request)
                .await
                .map_err(|err| AppError::Slack(format!("failed to read history: {err}")))?;

            Ok(response
                .messages
                .into_iter()
                .map(|message| HistoryEntry {
                    ts: message.origin.ts.0,
                    text: message.content.text,
                    user: message.sender.user.map(|user| user.0),
                    bot_authored: message.sender.bot_id.is_some(),
                })
                .collect())
        })
    }

    fn post_message<'a>(&'a self, channel: &'a str, text: &'a str) -> PlatformFuture<'a, String> {
        Box::pin(async move {
            let request = SlackApiChatPostMessageRequest::new(
                SlackChannelId(channel.to_owned()),
                SlackMessageContent::new().with_text(text.to_owned()),
            );
            let response = self
                .http_session()
                .chat_post_message(&request)
                .await
                .map_err(|err| AppError::Slack(format!("failed to post message: {err}")))?;
            debug!(channel, ts = %response.ts.0, "posted slack message");
            Ok(response.ts.0)
        })
    }

    fn delete_message<'a>(&'a self, channel: &'a str, ts: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let request = SlackApiChatDeleteRequest::new(
                SlackChannelId(channel.to_owned()),
                SlackTs(ts.to_owned()),
            );
            self.http_session()
                .chat_delete(&request)
                .await
                .map_err(|err| AppError::Slack(format!("failed to delete message: {err}")))?;
            Ok(())
        })
    }

    fn permalink<'a>(&'a self, channel: &'a str, ts: &'a str) -> PlatformFuture<'a, String> {
        Box::pin(async move {
            let request = SlackApiChatGetPermalinkRequest::new(
                SlackChannelId(channel.to_owned()),
                SlackTs(ts.to_owned()),
            );
            self.http_session()
                .chat_get_permalink(&request)
                .await
                .map(|response| response.permalink.to_string())
                .map_err(|err| AppError::Slack(format!("failed to resolve permalink: {err}")))
        })
    }

    fn display_name<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, Option<String>> {
        Box::pin(async move {
            let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_owned()));
            let response = self
                .http_session()
                .users_info(&request)
                .await
                .map_err(|err| AppError::Slack(format!("failed to read user info: {err}")))?;

            Ok(response
                .user
                .profile
                .and_then(|profile| {
                    non_blank(profile.display_name).or_else(|| non_blank(profile.real_name))
                }))
        })
    }

    fn group_members<'a>(&'a self, group_id: &'a str) -> PlatformFuture<'a, Vec<String>> {
        Box::pin(async move {
            let request =
                SlackApiUserGroupsUsersListRequest::new(SlackUserGroupId(group_id.to_owned()));
            self.http_session()
                .usergroups_users_list(&request)
                .await
                .map(|response| response.users.into_iter().map(|user| user.0).collect())
                .map_err(|err| AppError::Slack(format!("failed to list group members: {err}")))
        })
    }
}
