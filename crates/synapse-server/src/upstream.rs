use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::response::Response;
use http::HeaderMap;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use synapse_config::UpstreamConfig;

use crate::body::read_body;
use crate::caption::CHAT_COMPLETIONS_PATH;
use crate::error::FilterError;

const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Text model that receives filtered chat completions
pub struct Upstream {
    client: Client,
    url: String,
    api_key: Option<SecretString>,
}

impl Upstream {
    /// Build the forwarding client for `config`
    ///
    /// Only connecting is bounded; streamed completions may legitimately run long.
    pub fn new(config: &UpstreamConfig) -> reqwest::Result<Self> {
        let base = config.base_url.as_str().trim_end_matches('/');

        let client = Client::builder()
            .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
            .pool_idle_timeout(Some(Duration::from_secs(5)))
            .tcp_nodelay(true)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()?;

        Ok(Self {
            client,
            url: format!("{base}{CHAT_COMPLETIONS_PATH}"),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.expose_secret().is_empty()),
        })
    }
}

/// Forward a (filtered) chat completion to the upstream model
///
/// The configured key wins over the caller's `Authorization` header. Status,
/// content type and body are relayed, with the body streamed so SSE
/// responses pass through incrementally.
pub async fn forward_chat_completion(
    State(upstream): State<Arc<Upstream>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, FilterError> {
    let body = read_body(body).await?;

    let mut builder = upstream
        .client
        .post(&upstream.url)
        .header(CONTENT_TYPE, "application/json")
        .body(body);

    if let Some(key) = &upstream.api_key {
        builder = builder.bearer_auth(key.expose_secret());
    } else if let Some(authorization) = headers.get(AUTHORIZATION) {
        builder = builder.header(AUTHORIZATION, authorization.clone());
    }

    let response = builder.send().await.map_err(|e| {
        tracing::error!(url = %upstream.url, error = %e, "upstream request failed");
        FilterError::Upstream(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, "upstream returned error");
    }

    let mut relayed = Response::builder().status(status);
    if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
        relayed = relayed.header(CONTENT_TYPE, content_type.clone());
    }

    relayed
        .body(Body::from_stream(response.bytes_stream()))
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build relayed response");
            FilterError::Internal
        })
}
