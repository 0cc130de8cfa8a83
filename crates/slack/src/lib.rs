//! Slack integration for the translation relay.
//!
//! - **Events** (`events`) - decodes Events API webhook bodies into core events
//! - **Attachments** (`blocks`) - builds the threaded `chat.postMessage` payload
//! - **Web API** (`client`) - fetches the reacted message and posts the reply
//!
//! # Getting Started
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Subscribe to the `reaction_added` bot event and point the request URL at
//!    `https://<host>/slack/events`
//! 3. Grant `reactions:read`, `channels:history`, and `chat:write` scopes
//! 4. Set env vars: `BABELFLAG_SLACK_BOT_TOKEN`, `BABELFLAG_SLACK_VERIFICATION_TOKEN`
//!
//! # Architecture
//!
//! ```text
//! Events API → events::decode → EventPipeline → SlackWebClient (fetch)
//!                                     ↓
//!            chat.postMessage ← blocks::translation_reply
//! ```

pub mod blocks;
pub mod client;
pub mod events;

pub use client::{BotIdentity, SlackApiError, SlackWebClient};
pub use events::{decode, DecodeError};
