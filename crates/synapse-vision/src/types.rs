//! Typed view of an OpenAI-style chat request
//!
//! Only the fields the caption filter reads are typed. Everything else is
//! carried in `extra` maps or raw JSON values so it survives a round trip.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A request body; only `"messages"` is interpreted
pub type Body = Map<String, Value>;

/// Role of a message author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Any other role (`tool`, `developer`, ...), kept verbatim
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::System => "system".to_owned(),
            Role::User => "user".to_owned(),
            Role::Assistant => "assistant".to_owned(),
            Role::Other(other) => other,
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// `None` when the field was absent; an explicit `null` is `Some(Content::Other)`
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Remaining fields (`name`, `tool_calls`, metadata, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// A user turn carrying plain text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(Content::Text(text.into())),
            extra: Map::new(),
        }
    }
}

/// Message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Content {
    /// Plain text
    Text(String),
    /// Structured multi-part content
    Parts(Vec<ContentPart>),
    /// `null` or any other shape, passed through untouched
    Other(Value),
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(parts) => Self::Parts(parts.into_iter().map(ContentPart::from).collect()),
            other => Self::Other(other),
        }
    }
}

impl From<Content> for Value {
    fn from(content: Content) -> Self {
        match content {
            Content::Text(text) => Self::String(text),
            Content::Parts(parts) => Self::Array(parts.into_iter().map(Self::from).collect()),
            Content::Other(other) => other,
        }
    }
}

/// One element of a multi-part content array
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// `{"type": "text", "text": "..."}`
    Text { text: String },
    /// `{"type": "image_url", "image_url": {"url": "..."}}`
    ImageUrl(ImagePart),
    /// Any other part (audio, files, malformed entries)
    Other(Value),
}

impl From<Value> for ContentPart {
    fn from(value: Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some("text") => match value.get("text").and_then(Value::as_str) {
                Some(text) => Self::Text { text: text.to_owned() },
                None => Self::Other(value),
            },
            Some("image_url") => {
                let url = value
                    .pointer("/image_url/url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                Self::ImageUrl(ImagePart { url, raw: value })
            }
            _ => Self::Other(value),
        }
    }
}

impl From<ContentPart> for Value {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => serde_json::json!({ "type": "text", "text": text }),
            ContentPart::ImageUrl(image) => image.raw,
            ContentPart::Other(other) => other,
        }
    }
}

/// An `image_url` content part
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    /// `image_url.url`, empty when missing or not a string
    pub url: String,
    /// The complete original part, forwarded verbatim to the vision backend
    pub raw: Value,
}

/// Keep a present-but-null field distinguishable from an absent one
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parts_are_classified() {
        let content: Content = serde_json::from_value(json!([
            {"type": "text", "text": "hi"},
            {"type": "image_url", "image_url": {"url": "https://x/cat.png", "detail": "low"}},
            {"type": "input_audio", "input_audio": {"data": "..."}},
            {"type": "image_url", "image_url": "not-an-object"},
            "bare string"
        ]))
        .unwrap();

        let Content::Parts(parts) = content else {
            panic!("expected parts");
        };
        assert_eq!(parts[0], ContentPart::Text { text: "hi".to_owned() });
        let ContentPart::ImageUrl(image) = &parts[1] else {
            panic!("expected image part");
        };
        assert_eq!(image.url, "https://x/cat.png");
        assert_eq!(image.raw["image_url"]["detail"], "low");
        assert!(matches!(parts[2], ContentPart::Other(_)));
        assert!(matches!(&parts[3], ContentPart::ImageUrl(image) if image.url.is_empty()));
        assert!(matches!(parts[4], ContentPart::Other(Value::String(_))));
    }

    #[test]
    fn message_round_trip_keeps_unknown_fields() {
        let raw = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{"id": "call_1"}],
            "metadata": {"source": "ui"}
        });

        let message: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, Some(Content::Other(Value::Null)));
        assert_eq!(serde_json::to_value(&message).unwrap(), raw);
    }

    #[test]
    fn absent_content_stays_absent() {
        let raw = json!({"role": "tool", "tool_call_id": "call_1"});

        let message: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(message.role, Role::Other("tool".to_owned()));
        assert!(message.content.is_none());
        assert_eq!(serde_json::to_value(&message).unwrap(), raw);
    }

    #[test]
    fn message_without_role_is_rejected() {
        let result = serde_json::from_value::<Message>(json!({"content": "hi"}));
        assert!(result.is_err());
    }
}
