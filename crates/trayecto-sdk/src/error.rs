//! Error types for the Trayecto SDK.

use thiserror::Error;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Non-success HTTP status from the service
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body, or a placeholder if unreadable
        body: String,
    },

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection error (network, DNS, etc.)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Authentication or authorization error
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The request did not complete in time
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Response decoded but carries values the domain rejects
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Any other request failure
    #[error("Request error: {0}")]
    Request(String),
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SdkError::Timeout
        } else if e.is_connect() {
            SdkError::ConnectionError(e.to_string())
        } else if e.is_decode() {
            SdkError::Decode(e.to_string())
        } else if e.is_status() {
            match e.status() {
                Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                    SdkError::AuthError(format!("HTTP {}", status))
                }
                Some(status) => SdkError::Http {
                    status: status.as_u16(),
                    body: e.to_string(),
                },
                None => SdkError::Request(e.to_string()),
            }
        } else {
            SdkError::Request(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Decode(format!("JSON parsing error: {}", e))
    }
}
