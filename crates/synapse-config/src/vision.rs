use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

/// Instruction sent alongside the image when no prompt is configured
pub const DEFAULT_CAPTION_PROMPT: &str = "You convert the given image into a rich text in english language. \
Return ONLY the final prompt as a single line, no quotes, no extra text. \
Include: subject, environment, style, lighting, camera/lens, composition, \
key details, ethnicity of people, position and angle of the object in the picture, \
detailed clothes description, face description of people, look direction of people, \
posture of people, age of people. \
All these key description instructions need to be applied on each recognized object, \
person, scenery etc. be very detailed and structured in the description. \
Avoid meta-commentary.";

/// Vision captioning backend and filter behavior
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisionConfig {
    /// OpenAI-compatible vision backend, without the `/v1` suffix
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Model identifier sent to the vision backend
    #[serde(default = "default_model")]
    pub model: String,
    /// Bearer token for the vision backend
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Instruction prompt placed before the image
    #[serde(default = "default_caption_prompt")]
    pub caption_prompt: String,
    /// Request timeout, either seconds or a duration string such as `"90s"`
    #[serde(default = "default_timeout", deserialize_with = "deserialize_timeout")]
    pub timeout: Duration,
    /// Remove images even when no caption could be obtained
    #[serde(default = "default_strip_images_on_error")]
    pub strip_images_on_error: bool,
    /// URL suffixes that mark an `image_url` part as an image
    #[serde(default = "default_allowed_image_extensions")]
    pub allowed_image_extensions: Vec<String>,
    /// Model ids the filter applies to; `"*"` matches every model
    #[serde(default = "default_pipelines")]
    pub pipelines: Vec<String>,
    /// Ordering among host filters, lower runs earlier
    #[serde(default)]
    pub priority: i32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            caption_prompt: default_caption_prompt(),
            timeout: default_timeout(),
            strip_images_on_error: default_strip_images_on_error(),
            allowed_image_extensions: default_allowed_image_extensions(),
            pipelines: default_pipelines(),
            priority: 0,
        }
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:8282").expect("valid default URL")
}

fn default_model() -> String {
    "vLLMQwen3VL30B".to_string()
}

fn default_caption_prompt() -> String {
    DEFAULT_CAPTION_PROMPT.to_string()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

const fn default_strip_images_on_error() -> bool {
    true
}

fn default_allowed_image_extensions() -> Vec<String> {
    [".png", ".jpg", ".jpeg", ".webp", ".gif", ".bmp", ".tif", ".tiff"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_pipelines() -> Vec<String> {
    vec!["*".to_string()]
}

fn deserialize_timeout<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => duration_str::parse(&text)
            .map_err(|e| serde::de::Error::custom(format!("invalid duration '{text}': {e}"))),
    }
}
