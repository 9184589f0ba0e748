//! Vision backend boundary
//!
//! [`CaptionClient`] is the only thing the filter knows about the captioning
//! service. [`OpenAiCaptionClient`] talks to any OpenAI-compatible
//! `/v1/chat/completions` endpoint that accepts `image_url` parts.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use synapse_config::VisionConfig;

use crate::error::CaptionError;
use crate::http_client::http_client;
use crate::types::ImagePart;

/// Sampling temperature for caption requests
pub const CAPTION_TEMPERATURE: f32 = 0.2;

/// Produces a caption for a single image
#[async_trait]
pub trait CaptionClient: Send + Sync {
    /// Describe `image`, making exactly one attempt
    async fn caption(&self, image: &ImagePart) -> Result<String, CaptionError>;
}

/// OpenAI-compatible chat completions client used for captioning
pub struct OpenAiCaptionClient {
    client: Client,
    url: String,
    model: String,
    prompt: String,
    api_key: Option<SecretString>,
}

impl OpenAiCaptionClient {
    /// Build a client from the `[vision]` configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: &VisionConfig) -> anyhow::Result<Self> {
        let client =
            http_client(config.timeout).map_err(|e| anyhow::anyhow!("failed to build vision HTTP client: {e}"))?;

        let base = config.base_url.as_str().trim_end_matches('/');

        Ok(Self {
            client,
            url: format!("{base}/v1/chat/completions"),
            model: config.model.clone(),
            prompt: config.caption_prompt.clone(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.expose_secret().is_empty()),
        })
    }

    /// Endpoint the caption requests are posted to
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body<'a>(&'a self, image: &'a ImagePart) -> CaptionRequest<'a> {
        CaptionRequest {
            model: &self.model,
            messages: [CaptionMessage {
                role: "user",
                content: (
                    PromptPart {
                        kind: "text",
                        text: &self.prompt,
                    },
                    &image.raw,
                ),
            }],
            temperature: CAPTION_TEMPERATURE,
        }
    }
}

#[derive(Serialize)]
struct CaptionRequest<'a> {
    model: &'a str,
    messages: [CaptionMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct CaptionMessage<'a> {
    role: &'static str,
    /// Serialized as a two-element array: the prompt, then the original image part
    content: (PromptPart<'a>, &'a Value),
}

#[derive(Serialize)]
struct PromptPart<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct CaptionResponse {
    #[serde(default)]
    choices: Vec<CaptionChoice>,
}

#[derive(Deserialize)]
struct CaptionChoice {
    message: CaptionChoiceMessage,
}

#[derive(Deserialize)]
struct CaptionChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CaptionClient for OpenAiCaptionClient {
    async fn caption(&self, image: &ImagePart) -> Result<String, CaptionError> {
        tracing::debug!(url = %self.url, model = %self.model, "requesting image caption");

        let mut builder = self.client.post(&self.url).json(&self.request_body(image));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| CaptionError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error body: {e}"));
            return Err(CaptionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|e| CaptionError::from_transport(&e))?;
        let parsed: CaptionResponse =
            serde_json::from_slice(&body).map_err(|e| CaptionError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CaptionError::MalformedResponse("missing choices[0].message.content".to_owned()))
    }
}
