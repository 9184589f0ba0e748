use thiserror::Error;

/// Failure while obtaining a caption from the vision backend
///
/// Never escapes [`crate::CaptionFilter::process`]; the filter logs it and
/// falls back to its `strip_images_on_error` policy.
#[derive(Debug, Error)]
pub enum CaptionError {
    /// Request could not be sent or the response body could not be read
    #[error("connection error: {0}")]
    Connection(String),

    /// The configured timeout elapsed
    #[error("vision request timed out")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("vision backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response did not carry `choices[0].message.content` as a string
    #[error("malformed vision response: {0}")]
    MalformedResponse(String),
}

impl CaptionError {
    /// Classify a transport-level reqwest error
    pub(crate) fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else {
            Self::Connection(error.to_string())
        }
    }
}
