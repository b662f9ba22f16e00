use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("Failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("Request to {uri} timed out after {timeout:?}")]
    Timeout { uri: String, timeout: Duration },

    #[error("Unexpected status {status}: {body}")]
    Status { status: http::StatusCode, body: String },

    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(serde_json::Error),
}
