//! HTTP client abstraction for testability

use std::time::Duration;

use super::types::GeocodeError;

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes, [`GeocodeError::RateLimited`] for HTTP 429,
    /// or another [`GeocodeError`] for transport and status failures.
    fn get(&self, url: &str) -> Result<Vec<u8>, GeocodeError>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client identifying itself with `user_agent`.
    ///
    /// Public geocoding services reject requests without a descriptive
    /// user agent.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| GeocodeError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, GeocodeError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| GeocodeError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Http {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| GeocodeError::Transport(format!("Failed to read response: {}", e)))
    }
}
