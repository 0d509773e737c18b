//! Shared error type for every LightX operation.

/// Client operation result type.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Image size {size} bytes exceeds the {limit} byte limit")]
    SizeLimitExceeded { size: usize, limit: usize },

    #[error("LightX returned HTTP {status}")]
    NetworkError { status: u16 },

    #[error("LightX rejected the request ({status_code}): {message}")]
    ApiRejected { status_code: i64, message: String },

    #[error("Upload to pre-signed URL failed with HTTP {status}")]
    UploadFailed { status: u16 },

    #[error("Order {order_id} failed during processing")]
    ProcessingFailed { order_id: String },

    #[error("Order {order_id} did not finish after {attempts} attempts")]
    MaxRetriesReached { order_id: String, attempts: u32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode LightX response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether a failed status poll may be retried within the attempt budget.
    ///
    /// Covers every network or API failure of the poll request itself. Terminal
    /// job outcomes and caller mistakes are never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::NetworkError { .. }
                | ClientError::ApiRejected { .. }
                | ClientError::Http(_)
                | ClientError::Decode(_)
        )
    }

    /// HTTP status or envelope status code carried by the error, if any.
    pub fn status_code(&self) -> Option<i64> {
        match self {
            ClientError::NetworkError { status } | ClientError::UploadFailed { status } => {
                Some(i64::from(*status))
            }
            ClientError::ApiRejected { status_code, .. } => Some(*status_code),
            ClientError::Http(e) => e.status().map(|s| i64::from(s.as_u16())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::NetworkError { status: 502 }.is_transient());
        assert!(ClientError::ApiRejected {
            status_code: 5001,
            message: "busy".into()
        }
        .is_transient());
        assert!(!ClientError::ProcessingFailed {
            order_id: "o1".into()
        }
        .is_transient());
        assert!(!ClientError::SizeLimitExceeded { size: 10, limit: 5 }.is_transient());
        assert!(!ClientError::invalid_input("empty prompt").is_transient());
    }

    #[test]
    fn test_status_code_exposed() {
        assert_eq!(ClientError::NetworkError { status: 503 }.status_code(), Some(503));
        assert_eq!(ClientError::UploadFailed { status: 403 }.status_code(), Some(403));
        let rejected = ClientError::ApiRejected {
            status_code: 4001,
            message: "bad key".into(),
        };
        assert_eq!(rejected.status_code(), Some(4001));
        assert_eq!(rejected.to_string(), "LightX rejected the request (4001): bad key");
        assert_eq!(ClientError::config("x").status_code(), None);
    }
}
