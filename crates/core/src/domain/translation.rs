use serde::{Deserialize, Serialize};

/// A reaction event that resolved to a supported target language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTranslationRequest {
    pub channel_id: String,
    pub message_ts: String,
    pub reaction: String,
    pub target_language_code: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub text: String,
    pub timestamp: String,
}

impl SourceMessage {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub source_text: String,
    pub translated_text: String,
    pub source_language_code: String,
    pub target_language_code: String,
}

impl TranslationResult {
    /// `source-target`, the pair shown to readers of the reply.
    pub fn language_pair(&self) -> String {
        format!("{}-{}", self.source_language_code, self.target_language_code)
    }
}

/// Threaded reply delivered back to the channel the reaction came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub channel_id: String,
    pub thread_ts: String,
    pub header_text: String,
    pub body_text: String,
    pub footer_text: String,
}
