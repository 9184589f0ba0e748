use axum::body::{Body, Bytes};

use crate::error::FilterError;

/// Largest request body buffered by any endpoint (10 MiB)
///
/// Inline `data:image/...;base64` attachments routinely exceed axum's 2 MiB
/// extractor default.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Buffer a request body up to [`BODY_LIMIT_BYTES`]
///
/// Exceeding the limit is a 413; any other read failure (e.g. the client
/// going away mid-body) is a 400.
pub async fn read_body(body: Body) -> Result<Bytes, FilterError> {
    axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
        if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
            FilterError::PayloadTooLarge(BODY_LIMIT_BYTES)
        } else {
            FilterError::InvalidRequest(format!("failed to read request body: {err}"))
        }
    })
}
