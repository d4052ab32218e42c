//! Rate limiting and retries for geocoder calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::warn;

use super::error::GeocodeError;
use super::{Candidate, ReverseGeocoder, ReverseQuery};

/// Configuration for [`RateLimited`].
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Minimum time between the starts of two calls.
    pub min_delay: Duration,
    /// How many times a transiently failing call is retried.
    pub max_retries: u32,
    /// Extra wait before each retry.
    pub error_wait: Duration,
}

impl RateLimitConfig {
    pub fn new(min_delay: Duration, max_retries: u32) -> Self {
        Self {
            min_delay,
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_error_wait(mut self, wait: Duration) -> Self {
        self.error_wait = wait;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_retries: 3,
            error_wait: Duration::from_secs(5),
        }
    }
}

/// Wraps a geocoder so that calls are spaced out and transient failures retried.
///
/// Calls through one wrapper are serialized: the lock holding the time of the
/// last call is kept for the whole request.
pub struct RateLimited<G> {
    inner: G,
    config: RateLimitConfig,
    last_call: Mutex<Option<Instant>>,
}

impl<G: ReverseGeocoder> RateLimited<G> {
    pub fn new(inner: G, config: RateLimitConfig) -> Self {
        Self {
            inner,
            config,
            last_call: Mutex::new(None),
        }
    }

    /// Access the wrapped geocoder.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: ReverseGeocoder> ReverseGeocoder for RateLimited<G> {
    async fn reverse(&self, query: &ReverseQuery) -> Result<Option<Vec<Candidate>>, GeocodeError> {
        let mut last_call = self.last_call.lock().await;
        let mut attempt = 0;

        loop {
            if let Some(last) = *last_call {
                sleep_until(last + self.config.min_delay).await;
            }
            *last_call = Some(Instant::now());

            match self.inner.reverse(query).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "geocoder call failed, retrying"
                    );
                    sleep(self.config.error_wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
