//! Gateway error type.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by the gateway and its typed wrappers
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Identifier is not a positive integer; nothing was sent upstream
    #[error("invalid anime id: {input:?}")]
    InvalidId { input: String },

    /// Search text too short to send upstream
    #[error("search query must be at least {min_len} characters: {query:?}")]
    InvalidQuery { query: String, min_len: usize },

    /// Page numbers start at 1
    #[error("page must be at least 1")]
    InvalidPage,

    /// Page size outside what the upstream accepts
    #[error("limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: u32, max: u32 },

    /// Still rate limited after the automatic retry
    #[error("rate limited by upstream, retry exhausted after {attempts} attempts: {endpoint}")]
    RateLimited { endpoint: String, attempts: u32 },

    /// Network failure or timeout
    #[error("request failed: {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response other than 429
    #[error("request failed with status {status}: {endpoint}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    /// Upstream body did not match the expected shape
    #[error("failed to decode response: {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    /// Rejected locally before any network activity
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidId { .. }
                | Self::InvalidQuery { .. }
                | Self::InvalidPage
                | Self::InvalidLimit { .. }
        )
    }

    /// The requested entity does not exist (or could not be addressed)
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::InvalidId { .. } => true,
            Self::Status { status, .. } => *status == StatusCode::NOT_FOUND,
            _ => false,
        }
    }

    /// Upstream rate limit was still in effect after retrying
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Endpoint the failed request was addressed to, if one was built
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::RateLimited { endpoint, .. }
            | Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_is_not_found() {
        let err = GatewayError::InvalidId {
            input: "abc".to_string(),
        };
        assert!(err.is_invalid_input());
        assert!(err.is_not_found());
        assert!(err.endpoint().is_none());
    }

    #[test]
    fn test_status_classification() {
        let missing = GatewayError::Status {
            endpoint: "/anime/1/full".to_string(),
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_invalid_input());
        assert_eq!(missing.endpoint(), Some("/anime/1/full"));

        let broken = GatewayError::Status {
            endpoint: "/top/anime".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert!(!broken.is_not_found());
    }

    #[test]
    fn test_rate_limited_message() {
        let err = GatewayError::RateLimited {
            endpoint: "/seasons/now".to_string(),
            attempts: 2,
        };
        assert!(err.is_rate_limited());
        assert_eq!(
            err.to_string(),
            "rate limited by upstream, retry exhausted after 2 attempts: /seasons/now"
        );
    }
}
