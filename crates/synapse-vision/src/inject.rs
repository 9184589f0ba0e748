use crate::strip::flatten_parts;
use crate::types::{Content, Message, Role};

/// Merge a caption into the most recent user turn
///
/// The caption is trimmed and appended after a blank line, or becomes the
/// whole content when the turn is empty. Without any user turn a new one is
/// appended. Only the affected index differs from `messages`.
pub fn inject_caption(messages: &[Message], caption: &str) -> Vec<Message> {
    let caption = caption.trim();
    let mut injected = messages.to_vec();

    let Some(index) = messages.iter().rposition(|message| message.role == Role::User) else {
        injected.push(Message::user(caption));
        return injected;
    };

    let target = &mut injected[index];
    let mut text = match target.content.as_ref() {
        Some(Content::Text(text)) => text.clone(),
        Some(Content::Parts(parts)) => flatten_parts(parts),
        Some(Content::Other(_)) | None => String::new(),
    };

    if !text.is_empty() {
        text.push_str("\n\n");
    }
    text.push_str(caption);
    target.content = Some(Content::Text(text));

    injected
}
