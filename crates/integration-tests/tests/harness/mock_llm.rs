//! Mock OpenAI-compatible backend for integration tests
//!
//! Serves `/v1/chat/completions` with a canned reply and remembers every
//! request it receives. Plays the vision model or the upstream text model.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// A completion whose message content is the given text
    Content(String),
    /// An error status with an OpenAI-style error body
    Status(u16),
    /// A 200 response without `choices`
    Malformed,
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct Received {
    pub body: Value,
    pub authorization: Option<String>,
}

/// Mock backend that returns predictable responses
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    reply: Reply,
    received: Mutex<Vec<Received>>,
}

impl MockLlm {
    /// Start a mock that answers every completion with `content`
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start(Reply::Content(content.to_owned())).await
    }

    /// Start a mock that fails every completion with `status`
    pub async fn start_failing(status: u16) -> anyhow::Result<Self> {
        Self::start(Reply::Status(status)).await
    }

    /// Start the mock server, returning immediately
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            reply,
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .layer(DefaultBodyLimit::disable())
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL without `/v1`; clients append `/v1/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of completion requests received
    pub fn completion_count(&self) -> usize {
        self.state.received.lock().expect("lock").len()
    }

    /// Every request received so far, oldest first
    pub fn received(&self) -> Vec<Received> {
        self.state.received.lock().expect("lock").clone()
    }

    /// The most recent request
    pub fn last(&self) -> Received {
        self.received().pop().expect("at least one request")
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat_completions(
    State(state): State<Arc<MockLlmState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let model = body.get("model").cloned().unwrap_or(Value::Null);

    state.received.lock().expect("lock").push(Received {
        body,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    });

    match &state.reply {
        Reply::Content(content) => Json(json!({
            "id": "chatcmpl-test-123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .into_response(),
        Reply::Status(status) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({
                "error": {
                    "message": "mock server intentional failure",
                    "type": "server_error"
                }
            })),
        )
            .into_response(),
        Reply::Malformed => Json(json!({"id": "chatcmpl-test-123", "object": "chat.completion"})).into_response(),
    }
}
