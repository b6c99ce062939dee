/*
[INPUT]:  Error sources (transport, exchange rejections, query validation, WebSocket)
[OUTPUT]: Structured error types mirroring the exchange {code, msg} schema
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or exchange sentinel codes
*/

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Exchange error code: request timestamp is ahead of the server clock.
pub const TIMESTAMP_AHEAD_OF_SERVER: i64 = -1021;
/// Exchange error code: signature for this request is not valid (expired or malformed).
pub const INVALID_SIGNATURE: i64 = -1022;
/// Exchange error code: the listen key does not exist or has expired.
pub const INVALID_LISTEN_KEY: i64 = -1125;

/// Main error type for the options adapter
#[derive(Error, Debug)]
pub enum VoptionError {
    /// Transport failure, including request timeouts
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Exchange answered with a non-2xx status
    #[error("API error (status {status}, code {code:?}): {msg}")]
    Api {
        status: u16,
        code: Option<i64>,
        msg: String,
        payload: Value,
    },

    /// Query was not a mapping of scalars
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Endpoint requires credentials the client was built without
    #[error("Missing credentials for {security} endpoint {route}")]
    MissingCredentials {
        route: String,
        security: &'static str,
    },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VoptionError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VoptionError::Http(_) | VoptionError::WebSocket(_) | VoptionError::InvalidResponse(_)
        )
    }

    /// Exchange error code carried by an API rejection
    pub fn exchange_code(&self) -> Option<i64> {
        match self {
            VoptionError::Api { code, .. } => *code,
            _ => None,
        }
    }

    /// HTTP 400 with the timestamp-ahead sentinel
    pub fn is_timestamp_ahead(&self) -> bool {
        matches!(
            self,
            VoptionError::Api { status: 400, code: Some(TIMESTAMP_AHEAD_OF_SERVER), .. }
        )
    }

    pub fn is_invalid_listen_key(&self) -> bool {
        self.exchange_code() == Some(INVALID_LISTEN_KEY)
    }

    /// Create an API error from a status code and the raw response payload
    pub fn api_error(status: StatusCode, payload: Value) -> Self {
        let code = payload.get("code").and_then(Value::as_i64);
        let msg = payload
            .get("msg")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Response code {}", status.as_u16()));
        VoptionError::Api {
            status: status.as_u16(),
            code,
            msg,
            payload,
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, VoptionError>;
