//! Image captioning filter for chat requests
//!
//! Detects image attachments in an OpenAI-style conversation, asks a
//! vision-capable model to describe the first one, and rewrites the
//! conversation into plain text so it can be served by a text-only model.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
pub mod detect;
mod error;
mod filter;
mod http_client;
pub mod inject;
pub mod strip;
mod types;

pub use client::{CAPTION_TEMPERATURE, CaptionClient, OpenAiCaptionClient};
pub use error::CaptionError;
pub use filter::{CaptionFilter, FILTER_ID, FilterDescriptor, FilterOptions, process};
pub use types::{Body, Content, ContentPart, ImagePart, Message, Role};
