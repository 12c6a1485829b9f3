//! Bounded retry for geocoding lookups.
//!
//! # Example
//!
//! ```ignore
//! use photomap::geocode::{RetryPolicy, RetryingAuthority};
//!
//! // Up to 4 attempts: 1s, 2s, 4s between them
//! let authority = RetryingAuthority::new(nominatim, RetryPolicy::exponential(4));
//! ```

use std::time::Duration;

use tracing::{debug, warn};

use super::types::{Country, GeocodeError, GeocodingAuthority};
use crate::coord::Coordinate;

// =============================================================================
// Retry Policy Constants
// =============================================================================

/// Default initial delay for exponential backoff (1 second).
///
/// Public Nominatim allows one request per second, so shorter first delays
/// only earn another 429.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1_000;

/// Default maximum delay for exponential backoff (30 seconds).
pub const DEFAULT_MAX_DELAY_SECS: u64 = 30;

/// Default multiplier for exponential backoff.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default number of attempts per coordinate.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// How a lookup handles transient failures.
#[derive(Clone, Debug, PartialEq)]
pub enum RetryPolicy {
    /// No retries - fail immediately on error.
    None,

    /// Fixed number of attempts with constant delay between them.
    Fixed {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay between attempts.
        delay: Duration,
    },

    /// Exponential backoff, capped at `max_delay`.
    ExponentialBackoff {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay after the first failure.
        initial_delay: Duration,
        /// Maximum delay cap.
        max_delay: Duration,
        /// Multiplier applied after each failure.
        multiplier: f64,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    /// Exponential backoff with the default delays.
    pub fn exponential(max_attempts: u32) -> Self {
        Self::ExponentialBackoff {
            max_attempts,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Fixed delay between a bounded number of attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    /// Delay before retrying after failed attempt number `attempt` (1-based).
    ///
    /// Returns `None` once no attempts remain.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed {
                max_attempts,
                delay,
            } => (attempt < *max_attempts).then_some(*delay),
            Self::ExponentialBackoff {
                max_attempts,
                initial_delay,
                max_delay,
                multiplier,
            } => {
                if attempt >= *max_attempts {
                    return None;
                }
                let factor = multiplier.powi(attempt.saturating_sub(1) as i32);
                let delay_ms = initial_delay.as_millis() as f64 * factor;
                let capped = delay_ms.min(max_delay.as_millis() as f64) as u64;
                Some(Duration::from_millis(capped).min(*max_delay))
            }
        }
    }

    /// Maximum number of attempts, never less than one.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } => (*max_attempts).max(1),
            Self::ExponentialBackoff { max_attempts, .. } => (*max_attempts).max(1),
        }
    }
}

/// Wraps an authority with a [`RetryPolicy`].
///
/// Only retryable errors are retried. When attempts run out the last error
/// is returned inside [`GeocodeError::Exhausted`].
pub struct RetryingAuthority<A> {
    inner: A,
    policy: RetryPolicy,
    sleep: fn(Duration),
}

impl<A: GeocodingAuthority> RetryingAuthority<A> {
    /// Wrap `inner`, sleeping the calling thread between attempts.
    pub fn new(inner: A, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleep: std::thread::sleep,
        }
    }

    #[cfg(test)]
    fn without_sleep(inner: A, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleep: |_| {},
        }
    }

    /// The wrapped authority.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: GeocodingAuthority> GeocodingAuthority for RetryingAuthority<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn lookup(&self, coordinate: Coordinate) -> Result<Option<Country>, GeocodeError> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        loop {
            match self.inner.lookup(coordinate) {
                Ok(found) => return Ok(found),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => match self.policy.delay_for_attempt(attempt) {
                    Some(delay) if attempt < max_attempts => {
                        debug!(
                            authority = self.inner.name(),
                            %coordinate,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Geocoding failed, retrying"
                        );
                        (self.sleep)(delay);
                        attempt += 1;
                    }
                    _ => {
                        warn!(
                            authority = self.inner.name(),
                            %coordinate,
                            attempts = attempt,
                            error = %e,
                            "Geocoding failed, giving up"
                        );
                        return Err(GeocodeError::Exhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                },
            }
        }
    }
}
