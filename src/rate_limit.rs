use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::error::{NcbiError, Result};

/// Token bucket shared by every request a pipeline makes
///
/// NCBI E-utilities allow 3 requests per second without an API key and 10
/// with one; exceeding that can get the caller's IP blocked.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Take a token, or report how long until one is available
    fn try_take(&mut self) -> std::result::Result<(), Option<Duration>> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }
        if self.refill_rate <= 0.0 || !self.refill_rate.is_finite() {
            return Err(None);
        }
        let missing = 1.0 - self.tokens;
        Err(Some(Duration::from_secs_f64(missing / self.refill_rate)))
    }
}

impl RateLimiter {
    /// Create a limiter allowing `rate` requests per second
    ///
    /// # Arguments
    ///
    /// * `rate` - Maximum requests per second; the bucket holds at least one token
    ///
    /// # Examples
    ///
    /// ```
    /// use ncbiutils::RateLimiter;
    ///
    /// // Without an API key
    /// let limiter = RateLimiter::new(3.0);
    ///
    /// // With an API key
    /// let keyed = RateLimiter::new(10.0);
    /// ```
    pub fn new(rate: f64) -> Self {
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// 3 requests/second, the limit without an API key
    pub fn ncbi_default() -> Self {
        Self::new(3.0)
    }

    /// 10 requests/second, the limit with an API key
    pub fn ncbi_with_key() -> Self {
        Self::new(10.0)
    }

    /// Wait until a request may be sent
    ///
    /// Fails with [`NcbiError::RateLimitExceeded`] only when the limiter can
    /// never refill, i.e. it was built with a non-positive rate.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ncbiutils::RateLimiter;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let limiter = RateLimiter::ncbi_default();
    ///
    ///     for i in 0..5 {
    ///         limiter.acquire().await?;
    ///         println!("request {}", i + 1);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<()> {
        loop {
            let outcome = self.bucket.lock().await.try_take();
            match outcome {
                Ok(()) => {
                    debug!("Token acquired");
                    return Ok(());
                }
                Err(Some(wait)) => {
                    debug!(wait_ms = wait.as_millis(), "Waiting for rate limit token");
                    sleep(wait).await;
                }
                Err(None) => return Err(NcbiError::RateLimitExceeded),
            }
        }
    }

    /// Current token count, for tests and monitoring
    pub async fn token_count(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill();
        bucket.tokens
    }

    /// Configured requests per second
    pub async fn rate(&self) -> f64 {
        self.bucket.lock().await.refill_rate
    }
}
