use std::time::Duration;

use async_trait::async_trait;
use babelflag_core::{
    config::SlackConfig,
    domain::translation::{OutboundReply, SourceMessage},
    errors::CollaboratorError,
    ports::{MessageFetcher, ResponsePoster},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::blocks::{translation_reply, PostMessage};

const AUTH_TEST: &str = "auth.test";
const CONVERSATIONS_REPLIES: &str = "conversations.replies";
const CHAT_POST_MESSAGE: &str = "chat.postMessage";

#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("slack transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("slack {method} returned HTTP {status}: {body}")]
    Status { method: &'static str, status: u16, body: String },
    #[error("slack {method} returned an unparseable body: {source}")]
    Body { method: &'static str, source: serde_json::Error },
    #[error("slack {method} failed: {error}")]
    Api { method: &'static str, error: String },
    #[error("message {ts} was not found in channel {channel}")]
    MessageNotFound { channel: String, ts: String },
}

/// Workspace and bot user the token authenticates as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub team: String,
    pub user: String,
}

/// Slack Web API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackWebClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: SecretString,
}

impl SlackWebClient {
    pub fn new(
        bot_token: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SlackApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url, bot_token })
    }

    pub fn from_config(config: &SlackConfig) -> Result<Self, SlackApiError> {
        Self::new(
            config.bot_token.clone(),
            config.api_base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    pub async fn auth_test(&self) -> Result<BotIdentity, SlackApiError> {
        debug!(event_name = "slack.api.request", method = AUTH_TEST, "checking bot token");
        let response = self
            .http
            .post(self.url(AUTH_TEST))
            .bearer_auth(self.bot_token.expose_secret())
            .send()
            .await?;

        let payload = read_payload(AUTH_TEST, response).await?;
        Ok(BotIdentity {
            team: non_empty_str(&payload, "team").unwrap_or("unknown").to_owned(),
            user: non_empty_str(&payload, "user").unwrap_or("unknown").to_owned(),
        })
    }

    /// Fetch the message at `ts` in `channel_id`.
    ///
    /// `conversations.replies` always lists the thread parent first, so the
    /// window is narrowed to `ts` and the matching message is picked out. A
    /// reaction on a thread reply translates that reply, not its parent.
    pub async fn fetch_message(
        &self,
        channel_id: &str,
        ts: &str,
    ) -> Result<SourceMessage, SlackApiError> {
        debug!(
            event_name = "slack.api.request",
            method = CONVERSATIONS_REPLIES,
            channel_id = %channel_id,
            message_ts = %ts,
            "fetching reacted message"
        );
        let response = self
            .http
            .get(self.url(CONVERSATIONS_REPLIES))
            .bearer_auth(self.bot_token.expose_secret())
            .query(&[
                ("channel", channel_id),
                ("ts", ts),
                ("oldest", ts),
                ("latest", ts),
                ("inclusive", "true"),
                ("limit", "2"),
            ])
            .send()
            .await?;

        let payload = read_payload(CONVERSATIONS_REPLIES, response).await?;
        extract_source_message(&payload, ts).ok_or_else(|| SlackApiError::MessageNotFound {
            channel: channel_id.to_owned(),
            ts: ts.to_owned(),
        })
    }

    pub async fn post_message(&self, message: &PostMessage) -> Result<(), SlackApiError> {
        debug!(
            event_name = "slack.api.request",
            method = CHAT_POST_MESSAGE,
            channel_id = %message.channel,
            thread_ts = message.thread_ts.as_deref().unwrap_or(""),
            "posting threaded reply"
        );
        let response = self
            .http
            .post(self.url(CHAT_POST_MESSAGE))
            .bearer_auth(self.bot_token.expose_secret())
            .json(message)
            .send()
            .await?;

        read_payload(CHAT_POST_MESSAGE, response).await.map(|_| ())
    }
}

async fn read_payload(
    method: &'static str,
    response: reqwest::Response,
) -> Result<Value, SlackApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(
            event_name = "slack.api.failed",
            method,
            status = status.as_u16(),
            "slack returned a non-success status"
        );
        return Err(SlackApiError::Status { method, status: status.as_u16(), body });
    }

    let payload: Value =
        serde_json::from_str(&body).map_err(|source| SlackApiError::Body { method, source })?;
    check_ok(method, &payload)?;
    Ok(payload)
}

/// Slack answers most application errors with HTTP 200 and `"ok": false`.
fn check_ok(method: &'static str, payload: &Value) -> Result<(), SlackApiError> {
    if payload.get("ok") == Some(&Value::Bool(true)) {
        return Ok(());
    }

    let error = payload.get("error").and_then(Value::as_str).unwrap_or("unknown").to_owned();
    warn!(event_name = "slack.api.failed", method, error = %error, "slack rejected the call");
    Err(SlackApiError::Api { method, error })
}

/// Pull the message with timestamp `ts` out of a `conversations.replies`
/// payload, or the first message when none matches.
///
/// The timestamp falls back to `thread_ts`; the text falls back to the first
/// attachment's text when the message body is empty.
pub fn extract_source_message(payload: &Value, ts: &str) -> Option<SourceMessage> {
    let messages = payload.get("messages")?.as_array()?;
    let message = messages
        .iter()
        .find(|message| non_empty_str(message, "ts") == Some(ts))
        .or_else(|| messages.first())?;

    let timestamp = non_empty_str(message, "ts")
        .or_else(|| non_empty_str(message, "thread_ts"))
        .unwrap_or_default();
    let text = non_empty_str(message, "text")
        .or_else(|| {
            message
                .get("attachments")
                .and_then(Value::as_array)
                .and_then(|attachments| attachments.first())
                .and_then(|attachment| non_empty_str(attachment, "text"))
        })
        .unwrap_or_default();

    Some(SourceMessage { text: text.to_owned(), timestamp: timestamp.to_owned() })
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|text| !text.is_empty())
}

#[async_trait]
impl MessageFetcher for SlackWebClient {
    async fn fetch(&self, channel_id: &str, ts: &str) -> Result<SourceMessage, CollaboratorError> {
        self.fetch_message(channel_id, ts)
            .await
            .map_err(|error| CollaboratorError::fetch(error.to_string()))
    }
}

#[async_trait]
impl ResponsePoster for SlackWebClient {
    async fn post(&self, reply: &OutboundReply) -> Result<(), CollaboratorError> {
        self.post_message(&translation_reply(reply))
            .await
            .map_err(|error| CollaboratorError::post(error.to_string()))
    }
}
