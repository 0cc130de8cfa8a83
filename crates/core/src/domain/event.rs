use serde::{Deserialize, Serialize};

pub const REACTION_ADDED_EVENT_TYPE: &str = "reaction_added";

/// A decoded webhook delivery from the chat platform.
///
/// Every variant carries the verification token the platform sent with it;
/// the pipeline refuses to act on any variant whose token does not match
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundEvent {
    VerificationChallenge(VerificationChallenge),
    ReactionAdded(ReactionAddedEvent),
    Other { token: String, event_type: String },
}

impl InboundEvent {
    pub fn token(&self) -> &str {
        match self {
            Self::VerificationChallenge(challenge) => &challenge.token,
            Self::ReactionAdded(event) => &event.token,
            Self::Other { token, .. } => token,
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::VerificationChallenge(_) => "url_verification",
            Self::ReactionAdded(event) => &event.event_type,
            Self::Other { event_type, .. } => event_type,
        }
    }

    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Self::ReactionAdded(event) => Some(&event.channel_id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationChallenge {
    pub token: String,
    pub challenge: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    pub token: String,
    pub channel_id: String,
    pub message_ts: String,
    pub reaction: String,
    pub event_type: String,
}

impl ReactionAddedEvent {
    pub fn is_reaction_added(&self) -> bool {
        self.event_type == REACTION_ADDED_EVENT_TYPE
    }
}
