//! The event pipeline.
//!
//! One inbound event runs through a fixed sequence of steps: token check,
//! challenge echo, type filter, channel filter, language resolution, then the
//! collaborator-backed fetch → detect → translate → post chain. The first
//! step that decides the event's fate ends the run; nothing is retried here.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, info, warn};

use crate::{
    audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink},
    compose::compose_from_result,
    config::SlackConfig,
    domain::{
        event::{InboundEvent, ReactionAddedEvent},
        translation::{OutboundReply, ResolvedTranslationRequest, TranslationResult},
    },
    errors::{CollaboratorError, IgnoreReason, PipelineError, PipelineStage, RejectReason},
    languages,
    ports::{LanguageDetector, MessageFetcher, ResponsePoster, Translator},
};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_DIGEST_KEY: &[u8] = b"babelflag.verification-token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self { correlation_id: correlation_id.into() }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Ignored(IgnoreReason),
    Rejected(RejectReason),
    Failed(CollaboratorError),
}

impl Outcome {
    pub fn audit_outcome(&self) -> AuditOutcome {
        match self {
            Self::Handled => AuditOutcome::Handled,
            Self::Ignored(_) => AuditOutcome::Ignored,
            Self::Rejected(_) => AuditOutcome::Rejected,
            Self::Failed(_) => AuditOutcome::Failed,
        }
    }

    /// `Rejected` and `Failed` are surfaced to the caller; everything else is
    /// a success from the platform's point of view.
    pub fn into_error(self) -> Option<PipelineError> {
        match self {
            Self::Handled | Self::Ignored(_) => None,
            Self::Rejected(reason) => Some(PipelineError::Rejected(reason)),
            Self::Failed(error) => Some(PipelineError::Failed(error)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineResponse {
    pub outcome: Outcome,
    /// The reply that was posted, for logging; it has already been delivered.
    pub reply: Option<OutboundReply>,
    /// Handshake value to echo back verbatim.
    pub challenge: Option<String>,
}

impl PipelineResponse {
    fn handled(reply: OutboundReply) -> Self {
        Self { outcome: Outcome::Handled, reply: Some(reply), challenge: None }
    }

    fn challenge(challenge: String) -> Self {
        Self { outcome: Outcome::Handled, reply: None, challenge: Some(challenge) }
    }

    fn ignored(reason: IgnoreReason) -> Self {
        Self { outcome: Outcome::Ignored(reason), reply: None, challenge: None }
    }

    fn rejected(reason: RejectReason) -> Self {
        Self { outcome: Outcome::Rejected(reason), reply: None, challenge: None }
    }

    fn failed(error: CollaboratorError) -> Self {
        Self { outcome: Outcome::Failed(error), reply: None, challenge: None }
    }
}

#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub verification_token: SecretString,
    /// Empty means every channel is accepted.
    pub channel_allow_list: Vec<String>,
}

impl PipelineSettings {
    pub fn new(verification_token: impl Into<String>, channel_allow_list: Vec<String>) -> Self {
        Self { verification_token: verification_token.into().into(), channel_allow_list }
    }

    pub fn from_config(config: &SlackConfig) -> Self {
        Self {
            verification_token: config.verification_token.clone(),
            channel_allow_list: config.channel_ids.clone(),
        }
    }

    /// Compared as fixed-length digests in constant time.
    fn token_matches(&self, token: &str) -> bool {
        let Some(expected) = token_digest(self.verification_token.expose_secret()) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(TOKEN_DIGEST_KEY) else {
            return false;
        };
        mac.update(token.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn allows_channel(&self, channel_id: &str) -> bool {
        self.channel_allow_list.is_empty()
            || self.channel_allow_list.iter().any(|allowed| allowed == channel_id)
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn MessageFetcher>,
    pub detector: Arc<dyn LanguageDetector>,
    pub translator: Arc<dyn Translator>,
    pub poster: Arc<dyn ResponsePoster>,
}

pub struct EventPipeline {
    settings: PipelineSettings,
    collaborators: Collaborators,
    audit: Arc<dyn AuditSink>,
}

impl EventPipeline {
    pub fn new(settings: PipelineSettings, collaborators: Collaborators) -> Self {
        Self { settings, collaborators, audit: Arc::new(TracingAuditSink) }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub async fn handle(&self, event: &InboundEvent, ctx: &EventContext) -> PipelineResponse {
        let response = self.run(event, ctx).await;
        self.record(event, ctx, &response);
        response
    }

    async fn run(&self, event: &InboundEvent, ctx: &EventContext) -> PipelineResponse {
        if !self.settings.token_matches(event.token()) {
            warn!(
                event_name = "pipeline.event.rejected",
                correlation_id = %ctx.correlation_id,
                event_type = event.event_type(),
                "verification token mismatch"
            );
            return PipelineResponse::rejected(RejectReason::TokenMismatch);
        }

        let reaction = match event {
            InboundEvent::VerificationChallenge(challenge) => {
                info!(
                    event_name = "pipeline.challenge.accepted",
                    correlation_id = %ctx.correlation_id,
                    "url verification challenge accepted"
                );
                return PipelineResponse::challenge(challenge.challenge.clone());
            }
            InboundEvent::ReactionAdded(reaction) if reaction.is_reaction_added() => reaction,
            _ => {
                debug!(
                    event_name = "pipeline.event.ignored",
                    correlation_id = %ctx.correlation_id,
                    event_type = event.event_type(),
                    reason = IgnoreReason::UnsupportedEventType.as_str(),
                    "event type is not reaction_added"
                );
                return PipelineResponse::ignored(IgnoreReason::UnsupportedEventType);
            }
        };

        if !self.settings.allows_channel(&reaction.channel_id) {
            debug!(
                event_name = "pipeline.event.ignored",
                correlation_id = %ctx.correlation_id,
                channel_id = %reaction.channel_id,
                reason = IgnoreReason::ChannelNotAllowed.as_str(),
                "channel is not in the allow-list"
            );
            return PipelineResponse::ignored(IgnoreReason::ChannelNotAllowed);
        }

        let Some(request) = resolve_request(reaction) else {
            debug!(
                event_name = "pipeline.event.ignored",
                correlation_id = %ctx.correlation_id,
                channel_id = %reaction.channel_id,
                reaction = %reaction.reaction,
                reason = IgnoreReason::UnsupportedReaction.as_str(),
                "reaction does not denote a supported language"
            );
            return PipelineResponse::ignored(IgnoreReason::UnsupportedReaction);
        };

        match self.translate_and_post(&request, ctx).await {
            Ok(reply) => {
                info!(
                    event_name = "pipeline.translation.posted",
                    correlation_id = %ctx.correlation_id,
                    channel_id = %request.channel_id,
                    message_ts = %request.message_ts,
                    target = %request.target_language_code,
                    "translation posted"
                );
                PipelineResponse::handled(reply)
            }
            Err(error) => {
                warn!(
                    event_name = "pipeline.stage.failed",
                    correlation_id = %ctx.correlation_id,
                    channel_id = %request.channel_id,
                    message_ts = %request.message_ts,
                    stage = error.stage.as_str(),
                    error = %error,
                    "translation pipeline failed"
                );
                PipelineResponse::failed(error)
            }
        }
    }

    async fn translate_and_post(
        &self,
        request: &ResolvedTranslationRequest,
        ctx: &EventContext,
    ) -> Result<OutboundReply, CollaboratorError> {
        let message = self
            .collaborators
            .fetcher
            .fetch(&request.channel_id, &request.message_ts)
            .await
            .map_err(|error| error.in_stage(PipelineStage::Fetch))?;
        if message.is_empty() {
            return Err(CollaboratorError::fetch(format!(
                "message {} in {} has no text",
                request.message_ts, request.channel_id
            )));
        }
        debug!(
            event_name = "pipeline.stage.completed",
            correlation_id = %ctx.correlation_id,
            stage = PipelineStage::Fetch.as_str(),
            "source message fetched"
        );

        let source_code = self
            .collaborators
            .detector
            .detect(&message.text)
            .await
            .map_err(|error| error.in_stage(PipelineStage::Detect))?;
        if source_code.is_empty() {
            return Err(CollaboratorError::detect("no dominant language detected"));
        }
        debug!(
            event_name = "pipeline.stage.completed",
            correlation_id = %ctx.correlation_id,
            stage = PipelineStage::Detect.as_str(),
            source = %source_code,
            "source language detected"
        );

        let translated_text = self
            .collaborators
            .translator
            .translate(&message.text, &source_code, &request.target_language_code)
            .await
            .map_err(|error| error.in_stage(PipelineStage::Translate))?;
        debug!(
            event_name = "pipeline.stage.completed",
            correlation_id = %ctx.correlation_id,
            stage = PipelineStage::Translate.as_str(),
            "message translated"
        );

        let result = TranslationResult {
            source_text: message.text,
            translated_text,
            source_language_code: source_code,
            target_language_code: request.target_language_code.clone(),
        };
        let thread_ts =
            if message.timestamp.is_empty() { &request.message_ts } else { &message.timestamp };
        let reply = compose_from_result(&request.reaction, &result, thread_ts, &request.channel_id);

        self.collaborators
            .poster
            .post(&reply)
            .await
            .map_err(|error| error.in_stage(PipelineStage::Post))?;

        Ok(reply)
    }

    fn record(&self, event: &InboundEvent, ctx: &EventContext, response: &PipelineResponse) {
        let category = match &response.outcome {
            Outcome::Handled if response.reply.is_some() => AuditCategory::Delivery,
            Outcome::Failed(_) => AuditCategory::Translation,
            Outcome::Ignored(IgnoreReason::UnsupportedReaction) => AuditCategory::Resolution,
            _ => AuditCategory::Ingress,
        };
        let mut audit = AuditEvent::new(
            ctx.correlation_id.clone(),
            "pipeline.event.completed",
            category,
            response.outcome.audit_outcome(),
        )
        .with_metadata("event_type", event.event_type());

        if let InboundEvent::ReactionAdded(reaction) = event {
            audit = audit
                .with_message(reaction.channel_id.clone(), reaction.message_ts.clone())
                .with_metadata("reaction", reaction.reaction.clone());
        }
        audit = match &response.outcome {
            Outcome::Ignored(reason) => audit.with_metadata("reason", reason.as_str()),
            Outcome::Rejected(reason) => audit.with_metadata("reason", reason.to_string()),
            Outcome::Failed(error) => audit
                .with_metadata("stage", error.stage.as_str())
                .with_metadata("error", error.message.clone()),
            Outcome::Handled => audit,
        };

        self.audit.emit(audit);
    }
}

fn token_digest(token: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(TOKEN_DIGEST_KEY).ok()?;
    mac.update(token.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

fn resolve_request(event: &ReactionAddedEvent) -> Option<ResolvedTranslationRequest> {
    let target_language_code = languages::resolve(&event.reaction)?;
    Some(ResolvedTranslationRequest {
        channel_id: event.channel_id.clone(),
        message_ts: event.message_ts.clone(),
        reaction: event.reaction.clone(),
        target_language_code: target_language_code.to_owned(),
    })
}
