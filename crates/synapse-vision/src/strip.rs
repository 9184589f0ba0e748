use crate::types::{Content, ContentPart, Message};

/// Flatten every multi-part message into plain text
///
/// Text parts are joined with newlines and trimmed; image and other parts
/// are dropped. Messages whose content is not an array are copied as-is.
pub fn strip_images(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .map(|message| match &message.content {
            Some(Content::Parts(parts)) => Message {
                content: Some(Content::Text(flatten_parts(parts))),
                ..message.clone()
            },
            _ => message.clone(),
        })
        .collect()
}

/// Join the non-empty text parts with `\n` and trim the result
pub fn flatten_parts(parts: &[ContentPart]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}
