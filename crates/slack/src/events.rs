use babelflag_core::domain::event::{
    InboundEvent, ReactionAddedEvent, VerificationChallenge, REACTION_ADDED_EVENT_TYPE,
};
use serde::Deserialize;
use thiserror::Error;

pub const URL_VERIFICATION_TYPE: &str = "url_verification";
pub const EVENT_CALLBACK_TYPE: &str = "event_callback";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request body is not a valid Events API payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    token: String,
    #[serde(default, rename = "type")]
    envelope_type: String,
    #[serde(default)]
    challenge: String,
    #[serde(default)]
    event: Option<WireEvent>,
}

#[derive(Debug, Default, Deserialize)]
struct WireEvent {
    #[serde(default, rename = "type")]
    event_type: String,
    #[serde(default)]
    reaction: String,
    #[serde(default)]
    item: WireItem,
}

#[derive(Debug, Default, Deserialize)]
struct WireItem {
    #[serde(default)]
    channel: String,
    #[serde(default)]
    ts: String,
}

/// Decode a raw Events API request body.
///
/// Only malformed JSON is an error. Well-formed payloads the relay does not
/// act on decode to [`InboundEvent::Other`] so the pipeline can still check
/// their token.
pub fn decode(body: &[u8]) -> Result<InboundEvent, DecodeError> {
    let envelope: WireEnvelope = serde_json::from_slice(body)?;
    Ok(into_inbound(envelope))
}

fn into_inbound(envelope: WireEnvelope) -> InboundEvent {
    let WireEnvelope { token, envelope_type, challenge, event } = envelope;

    if envelope_type == URL_VERIFICATION_TYPE {
        return InboundEvent::VerificationChallenge(VerificationChallenge { token, challenge });
    }

    match event {
        Some(event)
            if envelope_type == EVENT_CALLBACK_TYPE
                && event.event_type == REACTION_ADDED_EVENT_TYPE =>
        {
            InboundEvent::ReactionAdded(ReactionAddedEvent {
                token,
                channel_id: event.item.channel,
                message_ts: event.item.ts,
                reaction: event.reaction,
                event_type: event.event_type,
            })
        }
        Some(event) if envelope_type == EVENT_CALLBACK_TYPE => {
            InboundEvent::Other { token, event_type: event.event_type }
        }
        _ => InboundEvent::Other { token, event_type: envelope_type },
    }
}

#[cfg(test)]
mod tests {
    use babelflag_core::domain::event::{InboundEvent, ReactionAddedEvent, VerificationChallenge};

    use super::{decode, DecodeError};

    #[test]
    fn decodes_url_verification_handshake() {
        let body = br#"{
            "token": "Jhj5dZrVaK7ZwHHjRyZWjbDl",
            "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P",
            "type": "url_verification"
        }"#;

        let event = decode(body).expect("valid handshake decodes");
        assert_eq!(
            event,
            InboundEvent::VerificationChallenge(VerificationChallenge {
                token: "Jhj5dZrVaK7ZwHHjRyZWjbDl".to_owned(),
                challenge: "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P".to_owned(),
            })
        );
    }

    #[test]
    fn decodes_reaction_added_callback() {
        let body = br#"{
            "token": "tok",
            "team_id": "T1",
            "type": "event_callback",
            "event": {
                "type": "reaction_added",
                "user": "U1",
                "reaction": "flag-jp",
                "item_user": "U2",
                "item": { "type": "message", "channel": "C1", "ts": "1360782400.498405" },
                "event_ts": "1360782804.083113"
            }
        }"#;

        let event = decode(body).expect("valid callback decodes");
        assert_eq!(
            event,
            InboundEvent::ReactionAdded(ReactionAddedEvent {
                token: "tok".to_owned(),
                channel_id: "C1".to_owned(),
                message_ts: "1360782400.498405".to_owned(),
                reaction: "flag-jp".to_owned(),
                event_type: "reaction_added".to_owned(),
            })
        );
    }

    #[test]
    fn other_callbacks_fall_back_with_inner_event_type() {
        let body = br#"{
            "token": "tok",
            "type": "event_callback",
            "event": { "type": "reaction_removed", "reaction": "jp",
                       "item": { "channel": "C1", "ts": "1.2" } }
        }"#;

        let event = decode(body).expect("callback decodes");
        assert_eq!(
            event,
            InboundEvent::Other { token: "tok".to_owned(), event_type: "reaction_removed".to_owned() }
        );
    }

    #[test]
    fn unknown_envelopes_fall_back_with_outer_type() {
        let event = decode(br#"{"token":"tok","type":"app_rate_limited"}"#).expect("decodes");
        assert_eq!(
            event,
            InboundEvent::Other { token: "tok".to_owned(), event_type: "app_rate_limited".to_owned() }
        );

        let event = decode(b"{}").expect("empty object decodes");
        assert_eq!(event, InboundEvent::Other { token: String::new(), event_type: String::new() });
    }

    #[test]
    fn malformed_bodies_are_decode_errors() {
        for body in [&b"not json"[..], b"", b"[1,2]", br#"{"token": 5}"#] {
            assert!(
                matches!(decode(body), Err(DecodeError::Json(_))),
                "`{}` should fail to decode",
                String::from_utf8_lossy(body)
            );
        }
    }
}
