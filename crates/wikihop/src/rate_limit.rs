//! Rate limiting for outbound article fetches.
//!
//! Wikipedia publishes per-client request budgets (anonymous and
//! authenticated tiers). This module enforces such a budget as a minimum
//! spacing between the *start times* of successive requests, shared by every
//! concurrent explorer task in the process. Concurrency overlaps parsing and
//! task bookkeeping; it never increases fetch throughput.
//!
//! # Examples
//!
//! ```rust,ignore
//! use wikihop::rate_limit::{RateLimiter, SpacedRateLimiter};
//!
//! # async fn example() {
//! // 500 requests per hour = one request every 7.2 seconds
//! let limiter = SpacedRateLimiter::per_hour(500);
//!
//! limiter.acquire().await;
//! // Start the request here
//! # }
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

const HOUR_SECS: f64 = 3600.0;

/// Error returned when rate limiter configuration is invalid.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RateLimiterConfigError {
    /// The requests-per-hour budget must be at least 1.
    #[error("Invalid request budget: must be at least 1 request per hour, got {0}")]
    InvalidBudget(u32),
}

/// A trait for rate limiters.
///
/// Implementations must be thread-safe and support both blocking and
/// non-blocking acquisition.
#[async_trait::async_trait]
pub trait RateLimiter: Send + Sync + std::fmt::Debug {
    /// Wait until the next request is allowed to start, then claim that
    /// start slot.
    async fn acquire(&self);

    /// Claim a start slot only if one is available right now.
    ///
    /// Returns `true` if the caller may start a request immediately,
    /// `false` if the spacing interval has not yet elapsed.
    fn try_acquire(&self) -> bool;
}

/// A rate limiter that spaces out request start times.
///
/// The shared state is a single timestamp: the earliest instant the next
/// request may start. `acquire` atomically takes that slot and advances it
/// by the configured interval, then sleeps until the slot arrives. For any
/// two granted acquisitions, the start times are therefore at least
/// `interval` apart, across every task in the process, no matter how many
/// run concurrently. The slot is taken under the lock but the sleep happens
/// after the lock is released, so a waiting task never blocks the others
/// out of the queue.
///
/// The limiter only delays; it never fails.
#[derive(Debug, Clone)]
pub struct SpacedRateLimiter {
    /// Earliest start of the next request. `None` until first use.
    next_start: Arc<Mutex<Option<Instant>>>,
    interval: Duration,
}

/// Two limiters compare equal when configured with the same spacing
/// interval; the runtime slot state is not part of the configured identity.
impl PartialEq for SpacedRateLimiter {
    fn eq(&self, other: &Self) -> bool {
        self.interval == other.interval
    }
}

impl SpacedRateLimiter {
    /// Create a limiter that keeps request starts at least `interval`
    /// apart.
    ///
    /// A zero interval disables spacing entirely.
    #[must_use]
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            next_start: Arc::new(Mutex::new(None)),
            interval,
        }
    }

    /// Create a limiter from a requests-per-hour budget, returning an error
    /// if the budget is zero.
    ///
    /// The spacing interval is `3600 / budget` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimiterConfigError::InvalidBudget`] if
    /// `requests_per_hour` is zero.
    pub fn try_per_hour(requests_per_hour: u32) -> Result<Self, RateLimiterConfigError> {
        if requests_per_hour == 0 {
            return Err(RateLimiterConfigError::InvalidBudget(requests_per_hour));
        }
        Ok(Self::with_interval(Duration::from_secs_f64(
            HOUR_SECS / f64::from(requests_per_hour),
        )))
    }

    /// Create a limiter from a requests-per-hour budget.
    ///
    /// # Panics
    ///
    /// Panics if `requests_per_hour` is zero. Use
    /// [`try_per_hour`](Self::try_per_hour) for a non-panicking
    /// alternative.
    // SAFETY: Panicking constructor with documented behavior; use try_per_hour() for fallible version
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn per_hour(requests_per_hour: u32) -> Self {
        Self::try_per_hour(requests_per_hour)
            .expect("SpacedRateLimiter::per_hour called with a zero budget")
    }

    /// The minimum spacing between request starts.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Take the next start slot and advance the shared state past it.
    fn take_slot(&self) -> Instant {
        // Recover from mutex poison - spacing can continue from the
        // recorded state.
        let mut next_start = match self.next_start.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        let slot = next_start.map_or(now, |earliest| earliest.max(now));
        *next_start = Some(slot + self.interval);
        slot
    }
}

#[async_trait::async_trait]
impl RateLimiter for SpacedRateLimiter {
    async fn acquire(&self) {
        let slot = self.take_slot();
        tokio::time::sleep_until(slot).await;
    }

    fn try_acquire(&self) -> bool {
        let mut next_start = match self.next_start.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        if next_start.map_or(true, |earliest| earliest <= now) {
            *next_start = Some(now + self.interval);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_hour_interval_derivation() {
        assert_eq!(
            SpacedRateLimiter::per_hour(3600).interval(),
            Duration::from_secs(1)
        );
        assert_eq!(
            SpacedRateLimiter::per_hour(500).interval(),
            Duration::from_secs_f64(7.2)
        );
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        assert_eq!(
            SpacedRateLimiter::try_per_hour(0),
            Err(RateLimiterConfigError::InvalidBudget(0))
        );
    }

    #[test]
    fn test_first_try_acquire_succeeds() {
        let limiter = SpacedRateLimiter::with_interval(Duration::from_millis(100));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_zero_interval_never_delays() {
        let limiter = SpacedRateLimiter::with_interval(Duration::ZERO);
        for _ in 0..10 {
            assert!(limiter.try_acquire());
        }
    }

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = SpacedRateLimiter::with_interval(Duration::from_secs(5));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_sequential_acquires_are_spaced() {
        let limiter = SpacedRateLimiter::with_interval(Duration::from_millis(100));

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        let elapsed = start.elapsed();

        // First slot is immediate, the next two are 100ms apart each.
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed <= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_concurrent_acquires_stay_spaced() {
        let limiter = Arc::new(SpacedRateLimiter::with_interval(Duration::from_millis(50)));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                Instant::now()
            }));
        }

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.expect("acquire task panicked"));
        }
        starts.sort();

        // Slots are exactly 50ms apart; wakeups only ever add delay, so
        // allow scheduler jitter on the earlier of each pair.
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(25));
        }
        // Six tasks cannot all start in less than five full intervals.
        assert!(starts[5] - starts[0] >= Duration::from_millis(230));
    }

    #[tokio::test]
    async fn test_try_acquire_recovers_after_interval() {
        let limiter = SpacedRateLimiter::with_interval(Duration::from_millis(50));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let limiter1 = SpacedRateLimiter::with_interval(Duration::from_millis(200));
        let limiter2 = limiter1.clone();

        assert!(limiter1.try_acquire());
        // limiter2 sees the same slot state: the interval has not elapsed.
        assert!(!limiter2.try_acquire());
    }

    #[tokio::test]
    async fn test_mixed_acquire_and_try_acquire() {
        let limiter = SpacedRateLimiter::with_interval(Duration::from_millis(60));

        limiter.acquire().await;
        assert!(!limiter.try_acquire());

        tokio::time::sleep(Duration::from_millis(90)).await;
        assert!(limiter.try_acquire());
    }
}
