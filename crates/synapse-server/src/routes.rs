use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::response::IntoResponse;
use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use synapse_vision::{CaptionFilter, FilterDescriptor};

use crate::body::read_body;
use crate::error::FilterError;

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// List the filters this host runs
pub async fn list_filters(State(filter): State<Arc<CaptionFilter>>) -> Json<Vec<FilterDescriptor>> {
    Json(vec![filter.descriptor()])
}

/// Payload a filter host sends before a request reaches the model
#[derive(Debug, Deserialize)]
struct InletRequest {
    body: Value,
    #[serde(default)]
    user: Option<Value>,
}

/// Run the caption filter over a request body and return the result
///
/// Bodies addressed to models outside the configured pipelines are echoed.
pub async fn filter_inlet(
    State(filter): State<Arc<CaptionFilter>>,
    payload: Body,
) -> Result<Json<Value>, FilterError> {
    let payload = read_body(payload).await?;
    let request: InletRequest = serde_json::from_slice(&payload)
        .map_err(|e| FilterError::InvalidRequest(format!("failed to parse inlet request: {e}")))?;

    let Value::Object(body) = request.body else {
        return Err(FilterError::InvalidRequest("`body` must be a JSON object".to_owned()));
    };

    let model = body.get("model").and_then(Value::as_str).map(str::to_owned);
    let user_id = request
        .user
        .as_ref()
        .and_then(|user| user.get("id"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    if !filter.applies_to(model.as_deref()) {
        tracing::debug!(model = ?model, "caption filter not configured for model");
        return Ok(Json(Value::Object(body)));
    }

    tracing::debug!(model = ?model, user = ?user_id, "running caption filter inlet");

    Ok(Json(Value::Object(filter.process(body).await)))
}
