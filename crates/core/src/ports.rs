//! Interfaces the pipeline needs from the outside world.
//!
//! Implementations live in the adapter crates (`babelflag-slack`,
//! `babelflag-aws`). They are shared across concurrently handled requests,
//! so every port is `Send + Sync`. None of them should retry on the
//! pipeline's behalf unless the backend itself calls for it.

use async_trait::async_trait;

use crate::{
    domain::translation::{OutboundReply, SourceMessage},
    errors::CollaboratorError,
};

#[async_trait]
pub trait MessageFetcher: Send + Sync {
    async fn fetch(&self, channel_id: &str, ts: &str) -> Result<SourceMessage, CollaboratorError>;
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Returns the translation-service code of the text's dominant language.
    async fn detect(&self, text: &str) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait ResponsePoster: Send + Sync {
    async fn post(&self, reply: &OutboundReply) -> Result<(), CollaboratorError>;
}
