use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Collaborator-backed step of the translation pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Fetch,
    Detect,
    Translate,
    Post,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Detect => "detect",
            Self::Translate => "translate",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational failure of an external collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{stage} failed: {message}")]
pub struct CollaboratorError {
    pub stage: PipelineStage,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self { stage, message: message.into() }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Fetch, message)
    }

    pub fn detect(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Detect, message)
    }

    pub fn translate(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Translate, message)
    }

    pub fn post(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Post, message)
    }

    /// Attribute the error to the stage whose collaborator returned it.
    pub fn in_stage(mut self, stage: PipelineStage) -> Self {
        self.stage = stage;
        self
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
    #[error("token mismatch")]
    TokenMismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    UnsupportedEventType,
    ChannelNotAllowed,
    UnsupportedReaction,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedEventType => "unsupported_event_type",
            Self::ChannelNotAllowed => "channel_not_allowed",
            Self::UnsupportedReaction => "unsupported_reaction",
        }
    }
}

/// Pipeline results the caller has to surface.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("event rejected: {0}")]
    Rejected(#[from] RejectReason),
    #[error(transparent)]
    Failed(#[from] CollaboratorError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn bad_request(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into(), correlation_id: correlation_id.into() }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "The request body could not be decoded.",
            Self::Unauthorized { .. } => "The request did not carry a valid verification token.",
            Self::ServiceUnavailable { .. } => {
                "The translation could not be completed. Please retry shortly."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unauthorized { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }
}

impl PipelineError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Rejected(reason) => {
                InterfaceError::Unauthorized { message: reason.to_string(), correlation_id }
            }
            Self::Failed(error) => {
                InterfaceError::ServiceUnavailable { message: error.to_string(), correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{
        CollaboratorError, InterfaceError, PipelineError, PipelineStage, RejectReason,
    };

    #[test]
    fn collaborator_error_names_failing_stage() {
        let error = CollaboratorError::translate("throttled");
        assert_eq!(error.stage, PipelineStage::Translate);
        assert_eq!(error.to_string(), "translate failed: throttled");
    }

    #[test]
    fn rejection_maps_to_unauthorized_interface_error() {
        let interface = PipelineError::from(RejectReason::TokenMismatch).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::Unauthorized { ref message, ref correlation_id }
                if message == "token mismatch" && correlation_id == "req-1"
        ));
    }

    #[test]
    fn collaborator_failure_maps_to_service_unavailable() {
        let interface =
            PipelineError::from(CollaboratorError::fetch("channel_not_found")).into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-2");
        assert_eq!(
            interface.user_message(),
            "The translation could not be completed. Please retry shortly."
        );
    }

    #[test]
    fn bad_request_has_user_safe_message() {
        let interface = InterfaceError::bad_request("expected value at line 1", "req-3");
        assert_eq!(interface.user_message(), "The request body could not be decoded.");
    }
}
