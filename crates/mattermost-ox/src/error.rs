use serde::Deserialize;
use thiserror::Error;

/// Categorizes errors by how a caller should react to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The token was rejected or lacks the required permissions
    Auth,
    /// The addressed resource does not exist
    NotFound,
    /// Network failures, unexpected bodies and any other server error
    Transport,
}

/// Error body returned by the Mattermost API v4.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub detailed_error: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

#[derive(Debug, Error)]
pub enum MattermostRequestError {
    /// Errors from the HTTP client
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    /// Authentication error (HTTP 401/403)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Any other error status reported by the server
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        id: Option<String>,
        message: String,
    },

    /// Unexpected response from the API
    #[error("Unexpected response from API: {0}")]
    UnexpectedResponse(String),
}

impl MattermostRequestError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Auth,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ReqwestError(_)
            | Self::SerdeError(_)
            | Self::RateLimit
            | Self::Api { .. }
            | Self::UnexpectedResponse(_) => ErrorKind::Transport,
        }
    }
}

/// Parse an error response from the Mattermost API.
/// Handles both the structured JSON error body and plain text bodies.
pub fn parse_error_response(status: reqwest::StatusCode, bytes: &[u8]) -> MattermostRequestError {
    let (id, message) = match serde_json::from_slice::<ApiErrorResponse>(bytes) {
        Ok(payload) => (payload.id, payload.message),
        Err(_) => (None, String::from_utf8_lossy(bytes).to_string()),
    };

    match status.as_u16() {
        401 | 403 => MattermostRequestError::Authentication(message),
        404 => MattermostRequestError::NotFound(message),
        429 => MattermostRequestError::RateLimit,
        code => MattermostRequestError::Api {
            status: code,
            id,
            message,
        },
    }
}
