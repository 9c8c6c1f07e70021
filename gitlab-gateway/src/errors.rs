//! Crate-wide error hierarchy for gitlab-gateway.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Root error type for the gitlab-gateway crate.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// GitLab API related failure.
    #[error(transparent)]
    Provider(#[from] GatewayProviderError),

    /// Configuration problems (missing token, bad base URL).
    #[error(transparent)]
    Config(#[from] GatewayConfigError),
}

/// Provider-specific error used inside the client.
#[derive(Debug, Error)]
pub enum GatewayProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum GatewayConfigError {
    /// Missing required access token.
    #[error("missing gitlab token")]
    MissingToken,

    /// Invalid base API URL.
    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Provider(GatewayProviderError::from(e))
    }
}

impl From<reqwest::Error> for GatewayProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GatewayProviderError::Timeout;
        }

        if let Some(status) = e.status() {
            return GatewayProviderError::from_status(status.as_u16());
        }

        if e.is_decode() {
            return GatewayProviderError::InvalidResponse(e.to_string());
        }

        GatewayProviderError::Network(e.to_string())
    }
}

impl GatewayProviderError {
    /// Maps a non-2xx HTTP status code onto a provider error.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => GatewayProviderError::Unauthorized,
            403 => GatewayProviderError::Forbidden,
            404 => GatewayProviderError::NotFound,
            429 => GatewayProviderError::RateLimited,
            500..=599 => GatewayProviderError::Server(code),
            _ => GatewayProviderError::HttpStatus(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert!(matches!(
            GatewayProviderError::from_status(401),
            GatewayProviderError::Unauthorized
        ));
        assert!(matches!(
            GatewayProviderError::from_status(404),
            GatewayProviderError::NotFound
        ));
        assert!(matches!(
            GatewayProviderError::from_status(429),
            GatewayProviderError::RateLimited
        ));
        assert!(matches!(
            GatewayProviderError::from_status(502),
            GatewayProviderError::Server(502)
        ));
        assert!(matches!(
            GatewayProviderError::from_status(418),
            GatewayProviderError::HttpStatus(418)
        ));
    }
}
