use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use synapse_config::VisionConfig;

use crate::client::{CaptionClient, OpenAiCaptionClient};
use crate::detect::find_images;
use crate::inject::inject_caption;
use crate::strip::strip_images;
use crate::types::{Body, Message};

/// Identifier the filter is registered under by hosts
pub const FILTER_ID: &str = "vision_caption";

/// Settings [`process`] reads
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Rewrite the conversation even when no caption could be obtained
    pub strip_images_on_error: bool,
    /// Lowercase URL suffixes that mark an image
    pub allowed_image_extensions: Vec<String>,
}

impl From<&VisionConfig> for FilterOptions {
    fn from(config: &VisionConfig) -> Self {
        Self {
            strip_images_on_error: config.strip_images_on_error,
            allowed_image_extensions: config
                .allowed_image_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }
}

/// Replace image attachments with a caption from a vision model
///
/// Returns `body` untouched when it has no `messages` array, when the
/// messages cannot be decoded, when no qualifying image is present, or when
/// captioning produced nothing and `strip_images_on_error` is off. Otherwise
/// every multi-part message is flattened to text and the caption, if any, is
/// merged into the latest user turn. Only the first image is captioned.
pub async fn process(body: Body, options: &FilterOptions, client: &dyn CaptionClient) -> Body {
    let decoded = match body.get("messages") {
        Some(Value::Array(items)) => Some(serde_json::from_value::<Vec<Message>>(Value::Array(items.clone()))),
        _ => None,
    };

    let messages = match decoded {
        Some(Ok(messages)) => messages,
        Some(Err(error)) => {
            tracing::warn!(%error, "messages could not be decoded, passing request through");
            return body;
        }
        None => {
            tracing::debug!("request has no messages array");
            return body;
        }
    };

    let images = find_images(&messages, &options.allowed_image_extensions);
    let Some(image) = images.first() else {
        tracing::debug!("no images found in conversation");
        return body;
    };

    if images.len() > 1 {
        tracing::debug!(count = images.len(), "multiple images found, captioning the first");
    }

    let caption = match client.caption(image).await {
        Ok(text) => text.trim().to_owned(),
        Err(error) => {
            tracing::warn!(%error, "vision captioning failed");
            String::new()
        }
    };

    if caption.is_empty() && !options.strip_images_on_error {
        tracing::debug!("no caption available, leaving images in place");
        return body;
    }

    let mut rewritten = strip_images(&messages);
    if !caption.is_empty() {
        rewritten = inject_caption(&rewritten, &caption);
    }

    let rewritten = match serde_json::to_value(&rewritten) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, "failed to encode rewritten messages, passing request through");
            return body;
        }
    };

    tracing::info!(
        captioned = !caption.is_empty(),
        caption_len = caption.len(),
        "replaced image attachments with text"
    );

    let mut body = body;
    body.insert("messages".to_owned(), rewritten);
    body
}

/// How a host lists this filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub pipelines: Vec<String>,
    pub priority: i32,
}

/// The caption filter bound to its configuration and vision client
pub struct CaptionFilter {
    client: Arc<dyn CaptionClient>,
    options: FilterOptions,
    pipelines: Vec<String>,
    priority: i32,
}

impl CaptionFilter {
    /// Build a filter backed by the configured OpenAI-compatible vision model
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn from_config(config: &VisionConfig) -> anyhow::Result<Self> {
        let client = OpenAiCaptionClient::new(config)?;
        tracing::debug!(url = %client.url(), model = %config.model, "vision caption filter initialized");
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Build a filter around an arbitrary caption client
    pub fn with_client(config: &VisionConfig, client: Arc<dyn CaptionClient>) -> Self {
        Self {
            client,
            options: FilterOptions::from(config),
            pipelines: config.pipelines.clone(),
            priority: config.priority,
        }
    }

    /// Whether the filter is configured for requests addressed to `model`
    pub fn applies_to(&self, model: Option<&str>) -> bool {
        self.pipelines
            .iter()
            .any(|pipeline| pipeline == "*" || model.is_some_and(|model| model == pipeline))
    }

    /// Run the filter over one request body
    pub async fn process(&self, body: Body) -> Body {
        process(body, &self.options, self.client.as_ref()).await
    }

    pub fn descriptor(&self) -> FilterDescriptor {
        FilterDescriptor {
            id: FILTER_ID,
            name: "Vision Caption Filter",
            kind: "filter",
            pipelines: self.pipelines.clone(),
            priority: self.priority,
        }
    }
}
