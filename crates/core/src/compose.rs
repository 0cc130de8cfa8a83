use crate::domain::translation::{OutboundReply, TranslationResult};

/// Build the threaded reply for a finished translation.
///
/// Texts are moved into the reply untouched; the header names the reaction
/// and the `source-target` pair so readers can tell which languages were
/// used.
pub fn compose(
    reaction: &str,
    source_code: &str,
    target_code: &str,
    original_text: &str,
    translated_text: &str,
    thread_ts: &str,
    channel_id: &str,
) -> OutboundReply {
    OutboundReply {
        channel_id: channel_id.to_owned(),
        thread_ts: thread_ts.to_owned(),
        header_text: header_text(reaction, source_code, target_code),
        body_text: translated_text.to_owned(),
        footer_text: original_text.to_owned(),
    }
}

pub fn compose_from_result(
    reaction: &str,
    result: &TranslationResult,
    thread_ts: &str,
    channel_id: &str,
) -> OutboundReply {
    compose(
        reaction,
        &result.source_language_code,
        &result.target_language_code,
        &result.source_text,
        &result.translated_text,
        thread_ts,
        channel_id,
    )
}

fn header_text(reaction: &str, source_code: &str, target_code: &str) -> String {
    format!("_The message is translated in_ :{reaction}: _({source_code}-{target_code})_")
}

#[cfg(test)]
mod tests {
    use super::{compose, compose_from_result};
    use crate::domain::translation::TranslationResult;

    #[test]
    fn reply_carries_texts_byte_for_byte() {
        let original = "  Hello,\n\tworld  *bold* <@U1> ";
        let translated = "こんにちは、\r\n世界 🇯🇵";
        let reply = compose("jp", "en", "ja", original, translated, "100.1", "C1");

        assert_eq!(reply.body_text.as_bytes(), translated.as_bytes());
        assert_eq!(reply.footer_text.as_bytes(), original.as_bytes());
        assert_eq!(reply.thread_ts, "100.1");
        assert_eq!(reply.channel_id, "C1");
    }

    #[test]
    fn header_names_reaction_and_language_pair() {
        let reply = compose("flag-fr", "de", "fr", "Hallo", "Bonjour", "1.2", "C9");
        assert_eq!(reply.header_text, "_The message is translated in_ :flag-fr: _(de-fr)_");
    }

    #[test]
    fn compose_from_result_uses_result_languages() {
        let result = TranslationResult {
            source_text: "Hola".to_owned(),
            translated_text: "Hello".to_owned(),
            source_language_code: "es".to_owned(),
            target_language_code: "en".to_owned(),
        };
        let reply = compose_from_result("us", &result, "5.5", "C2");

        assert!(reply.header_text.contains(&result.language_pair()));
        assert_eq!(reply.body_text, "Hello");
        assert_eq!(reply.footer_text, "Hola");
    }
}
