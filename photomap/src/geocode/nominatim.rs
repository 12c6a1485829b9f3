//! Nominatim reverse geocoding.
//!
//! Queries the `/reverse` endpoint at country zoom and reads the
//! `address.country_code` / `address.country` fields. Requests are spaced by a
//! minimum interval to stay within the service's usage policy.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::trace;

use super::http::HttpClient;
use super::types::{Country, GeocodeError, GeocodingAuthority};
use crate::coord::Coordinate;

/// Public OSM Nominatim instance.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

/// Minimum spacing between requests allowed by the public instance.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1_000;

/// Country-level detail in Nominatim's zoom scale.
const COUNTRY_ZOOM: u8 = 3;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Reverse geocoder backed by a Nominatim-compatible service.
pub struct NominatimAuthority<C: HttpClient> {
    http: C,
    endpoint: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl<C: HttpClient> NominatimAuthority<C> {
    /// Create an authority against the public endpoint.
    pub fn new(http: C) -> Self {
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            min_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            last_request: Mutex::new(None),
        }
    }

    /// Use a different base URL (self-hosted instance, for example).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the minimum spacing between consecutive requests.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    fn reverse_url(&self, coordinate: Coordinate) -> String {
        format!(
            "{}/reverse?format=jsonv2&zoom={}&accept-language=en&lat={}&lon={}",
            self.endpoint,
            COUNTRY_ZOOM,
            coordinate.lat(),
            coordinate.lon()
        )
    }

    /// Block until `min_interval` has passed since the previous request.
    fn throttle(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

/// Interpret a reverse geocoding response body.
fn parse_reverse(body: &[u8]) -> Result<Option<Country>, GeocodeError> {
    let response: ReverseResponse = serde_json::from_slice(body)
        .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    if let Some(error) = response.error {
        trace!(error = %error, "Reverse lookup found no place");
        return Ok(None);
    }

    let Some(address) = response.address else {
        return Ok(None);
    };
    match address.country_code {
        Some(code) if !code.trim().is_empty() => Ok(Some(Country::new(
            code,
            address.country.unwrap_or_default(),
        ))),
        _ => Ok(None),
    }
}

impl<C: HttpClient> GeocodingAuthority for NominatimAuthority<C> {
    fn name(&self) -> &str {
        "nominatim"
    }

    fn lookup(&self, coordinate: Coordinate) -> Result<Option<Country>, GeocodeError> {
        self.throttle();
        let url = self.reverse_url(coordinate);
        trace!(url = %url, "Reverse geocoding");
        let body = self.http.get(&url)?;
        parse_reverse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::http::tests::MockHttpClient;

    fn paris() -> Coordinate {
        Coordinate::new(2.35, 48.85).unwrap()
    }

    #[test]
    fn test_parses_country_from_address() {
        let body = br#"{
            "place_id": 1,
            "display_name": "France",
            "address": {"country": "France", "country_code": "fr"}
        }"#;
        let country = parse_reverse(body).unwrap();
        assert_eq!(country, Some(Country::new("FR", "France")));
    }

    #[test]
    fn test_error_body_means_no_country() {
        let body = br#"{"error": "Unable to geocode"}"#;
        assert_eq!(parse_reverse(body).unwrap(), None);
    }

    #[test]
    fn test_missing_country_code_means_no_country() {
        let body = br#"{"address": {"country": "Somewhere"}}"#;
        assert_eq!(parse_reverse(body).unwrap(), None);
    }

    #[test]
    fn test_garbage_body_is_invalid_response() {
        let err = parse_reverse(b"<html>busy</html>").unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidResponse(_)));
    }

    #[test]
    fn test_lookup_builds_reverse_url() {
        let mock = MockHttpClient::new(Ok(
            br#"{"address": {"country": "France", "country_code": "fr"}}"#.to_vec(),
        ));
        let authority = NominatimAuthority::new(mock)
            .with_endpoint("http://localhost:8080/")
            .with_min_interval(Duration::ZERO);

        let country = authority.lookup(paris()).unwrap();

        assert_eq!(country, Some(Country::new("FR", "France")));
        let requested = authority.http.requested();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].starts_with("http://localhost:8080/reverse?"));
        assert!(requested[0].contains("lat=48.85"));
        assert!(requested[0].contains("lon=2.35"));
        assert!(requested[0].contains("zoom=3"));
    }

    #[test]
    fn test_lookup_propagates_rate_limit() {
        let mock = MockHttpClient::new(Err(GeocodeError::RateLimited));
        let authority = NominatimAuthority::new(mock).with_min_interval(Duration::ZERO);

        assert_eq!(
            authority.lookup(paris()).unwrap_err(),
            GeocodeError::RateLimited
        );
    }

    #[test]
    fn test_throttle_spaces_requests() {
        let mock = MockHttpClient::new(Ok(br#"{"error": "none"}"#.to_vec()));
        let authority =
            NominatimAuthority::new(mock).with_min_interval(Duration::from_millis(20));

        let start = Instant::now();
        authority.lookup(paris()).unwrap();
        authority.lookup(paris()).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
