//! Caption middleware for chat completion requests

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, Method, header::CONTENT_LENGTH};
use serde_json::Value;
use synapse_vision::CaptionFilter;

use crate::body::read_body;

/// Path whose request bodies are rewritten
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Replace image attachments in chat completion requests with captions
///
/// Bodies that are not JSON objects, or that target a model the filter is
/// not configured for, are forwarded byte for byte.
pub async fn caption_middleware(filter: Arc<CaptionFilter>, request: Request, next: Next) -> Response {
    if request.method() != Method::POST || request.uri().path() != CHAT_COMPLETIONS_PATH {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, "failed to buffer chat completion body");
            return error.into_response();
        }
    };

    let bytes = rewrite_body(&filter, bytes).await;

    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    let request = Request::from_parts(parts, Body::from(bytes));
    next.run(request).await
}

async fn rewrite_body(filter: &CaptionFilter, bytes: Bytes) -> Bytes {
    let Ok(Value::Object(body)) = serde_json::from_slice::<Value>(&bytes) else {
        return bytes;
    };

    let model = body.get("model").and_then(Value::as_str);
    if !filter.applies_to(model) {
        tracing::debug!(model = ?model, "caption filter not configured for model");
        return bytes;
    }

    let processed = filter.process(body).await;

    match serde_json::to_vec(&processed) {
        Ok(encoded) => Bytes::from(encoded),
        Err(error) => {
            tracing::warn!(%error, "failed to encode filtered body, forwarding original");
            bytes
        }
    }
}
