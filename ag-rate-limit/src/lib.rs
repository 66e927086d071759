//! Process-wide admission control (spec §4.1).
//!
//! Unlike a per-user or per-IP limiter, the gateway applies a single token
//! bucket shared by every inbound request — there is no request-scoped key.

use std::sync::Mutex;
use std::time::{Duration, Instant};

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Refill tokens based on elapsed time and try to consume one.
/// Returns `true` if a token was consumed, `false` if rate-limited.
#[inline]
fn refill_and_try_consume(tokens: &mut f64, last_refill: &mut Instant, max_tokens: f64, window: Duration) -> bool {
    let now = Instant::now();
    let elapsed = now.duration_since(*last_refill);
    let refill = (elapsed.as_secs_f64() / window.as_secs_f64()) * max_tokens;
    *tokens = (*tokens + refill).min(max_tokens);
    *last_refill = now;

    if *tokens >= 1.0 {
        *tokens -= 1.0;
        true
    } else {
        false
    }
}

/// A single, process-wide token bucket.
///
/// `try_acquire` never blocks: an exhausted bucket returns `false`
/// immediately and the caller is expected to reject the request (spec §4.1 —
/// admission control runs before any other orchestration step).
pub struct RateLimiter {
    max_tokens: f64,
    window: Duration,
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Allow `max` requests per `window`, shared across the whole process.
    pub fn new(max: u64, window: Duration) -> Self {
        Self {
            max_tokens: max as f64,
            window,
            bucket: Mutex::new(TokenBucket {
                tokens: max as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Try to consume one token. Returns `true` if the request is admitted.
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().expect("rate limiter mutex poisoned");
        let allowed = refill_and_try_consume(&mut bucket.tokens, &mut bucket.last_refill, self.max_tokens, self.window);
        if !allowed {
            tracing::debug!("rate limit exceeded, rejecting request");
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn allows_within_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
    }

    #[test]
    fn blocks_over_limit() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn refills_over_time() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        sleep(Duration::from_millis(110));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn bucket_is_shared_across_all_callers() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        assert!(limiter.try_acquire());
        // A second, logically distinct caller still draws from the same bucket.
        assert!(!limiter.try_acquire());
    }
}
