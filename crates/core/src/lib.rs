pub mod audit;
pub mod compose;
pub mod config;
pub mod domain;
pub mod errors;
pub mod languages;
pub mod pipeline;
pub mod ports;

pub use audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::event::{InboundEvent, ReactionAddedEvent, VerificationChallenge};
pub use domain::translation::{
    OutboundReply, ResolvedTranslationRequest, SourceMessage, TranslationResult,
};
pub use errors::{
    CollaboratorError, IgnoreReason, InterfaceError, PipelineError, PipelineStage, RejectReason,
};
pub use pipeline::{
    Collaborators, EventContext, EventPipeline, Outcome, PipelineResponse, PipelineSettings,
};
pub use ports::{LanguageDetector, MessageFetcher, ResponsePoster, Translator};
