#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod server;
pub mod telemetry;
pub mod vision;

use serde::Deserialize;

pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};
pub use vision::*;

/// Top-level configuration for the vision caption filter
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP host configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Vision captioning backend and filter behavior
    #[serde(default)]
    pub vision: VisionConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
