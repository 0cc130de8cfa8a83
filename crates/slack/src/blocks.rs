use babelflag_core::domain::translation::OutboundReply;
use serde::Serialize;

/// Attachment fields Slack renders as mrkdwn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownField {
    Text,
    Pretext,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pretext: String,
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mrkdwn_in: Vec<MarkdownField>,
}

/// Body of a `chat.postMessage` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostMessage {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    pub as_user: bool,
    pub attachments: Vec<Attachment>,
}

pub struct MessageBuilder {
    channel: String,
    thread_ts: Option<String>,
    attachments: Vec<Attachment>,
}

impl MessageBuilder {
    pub fn new(channel: impl Into<String>) -> Self {
        Self { channel: channel.into(), thread_ts: None, attachments: Vec::new() }
    }

    pub fn in_thread(mut self, thread_ts: impl Into<String>) -> Self {
        self.thread_ts = Some(thread_ts.into());
        self
    }

    pub fn attachment<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut AttachmentBuilder),
    {
        let mut builder = AttachmentBuilder::default();
        build(&mut builder);
        self.attachments.push(builder.build());
        self
    }

    pub fn build(self) -> PostMessage {
        PostMessage {
            channel: self.channel,
            thread_ts: self.thread_ts,
            as_user: false,
            attachments: self.attachments,
        }
    }
}

#[derive(Default)]
pub struct AttachmentBuilder {
    attachment: Attachment,
}

impl AttachmentBuilder {
    pub fn pretext(&mut self, pretext: impl Into<String>) -> &mut Self {
        self.attachment.pretext = pretext.into();
        self
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.attachment.text = text.into();
        self
    }

    pub fn footer(&mut self, footer: impl Into<String>) -> &mut Self {
        self.attachment.footer = footer.into();
        self
    }

    pub fn markdown_in(&mut self, field: MarkdownField) -> &mut Self {
        if !self.attachment.mrkdwn_in.contains(&field) {
            self.attachment.mrkdwn_in.push(field);
        }
        self
    }

    fn build(self) -> Attachment {
        self.attachment
    }
}

/// Render a composed reply as a threaded single-attachment message: header as
/// pretext, translation as text, original as footer.
pub fn translation_reply(reply: &OutboundReply) -> PostMessage {
    let builder = MessageBuilder::new(reply.channel_id.clone());
    let builder = if reply.thread_ts.is_empty() {
        builder
    } else {
        builder.in_thread(reply.thread_ts.clone())
    };

    builder
        .attachment(|attachment| {
            attachment
                .pretext(reply.header_text.clone())
                .text(reply.body_text.clone())
                .footer(reply.footer_text.clone())
                .markdown_in(MarkdownField::Text)
                .markdown_in(MarkdownField::Pretext);
        })
        .build()
}
