//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use synapse_config::{Config, HealthConfig, ServerConfig, UpstreamConfig, VisionConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder whose vision backend is the mock at `vision_url`
    pub fn new(vision_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    upstream: None,
                },
                vision: VisionConfig {
                    base_url: vision_url.parse().expect("valid URL"),
                    model: "mock-vision".to_owned(),
                    caption_prompt: "Describe the image.".to_owned(),
                    timeout: Duration::from_secs(2),
                    ..VisionConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// Forward chat completions to a mock text model
    pub fn with_upstream(mut self, base_url: &str, api_key: Option<&str>) -> Self {
        self.config.server.upstream = Some(UpstreamConfig {
            base_url: base_url.parse().expect("valid URL"),
            api_key: api_key.map(SecretString::from),
        });
        self
    }

    /// Set the bearer token sent to the vision backend
    pub fn with_vision_key(mut self, key: &str) -> Self {
        self.config.vision.api_key = Some(SecretString::from(key));
        self
    }

    /// Keep images when captioning fails
    pub fn keep_images_on_error(mut self) -> Self {
        self.config.vision.strip_images_on_error = false;
        self
    }

    /// Restrict the filter to specific model ids
    pub fn with_pipelines(mut self, pipelines: &[&str]) -> Self {
        self.config.vision.pipelines = pipelines.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    /// Set the host ordering priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.config.vision.priority = priority;
        self
    }

    /// Serve health checks on a different path
    pub fn with_health_path(mut self, path: &str) -> Self {
        self.config.server.health.path = path.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
