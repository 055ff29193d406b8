use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the upstream forecast API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Upstream answered 400: unknown location or bad API key.
    #[error("upstream rejected the query with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("upstream request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to reach upstream: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse upstream forecast JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Request-level failures. `Display` is the message shown to clients.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("City query parameter is required.")]
    InvalidRequest,

    #[error("City '{query}' not found or API Key is invalid.")]
    LocationNotFound { query: String },

    #[error("Server could not fetch weather data.")]
    UpstreamUnavailable(#[source] ProviderError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest => StatusCode::BAD_REQUEST,
            GatewayError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(GatewayError::InvalidRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::LocationNotFound { query: "Atlantis".into() }.status_code(),
            StatusCode::NOT_FOUND
        );

        let cause = ProviderError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "boom".into(),
        };
        assert_eq!(
            GatewayError::UpstreamUnavailable(cause).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unavailable_message_hides_cause() {
        let cause = ProviderError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "secret internal detail".into(),
        };
        let err = GatewayError::UpstreamUnavailable(cause);

        assert_eq!(err.to_string(), "Server could not fetch weather data.");
        let source = std::error::Error::source(&err).expect("cause is kept as source");
        assert!(source.to_string().contains("secret internal detail"));
    }

    #[test]
    fn not_found_message_names_the_query() {
        let err = GatewayError::LocationNotFound { query: "Atlantis".into() };
        assert_eq!(err.to_string(), "City 'Atlantis' not found or API Key is invalid.");
    }
}
