// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Dispatch pacing
//!
//! [`RateLimiter`] keeps the instant of the last permitted dispatch behind an
//! async mutex. The lock is held across the wait, so concurrent callers queue
//! up and each one is spaced from the previous grant rather than from its own
//! arrival.

use std::time::Duration;

use tokio::{
    sync::Mutex,
    time::{Instant, sleep_until},
};
use tracing::{debug, trace};

/// Enforces a minimum interval between provider requests
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter; a zero interval disables pacing
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request may be dispatched, then claim the slot
    ///
    /// Returns how long the caller was held back. Never fails.
    pub async fn acquire(&self) -> Duration {
        if self.min_interval.is_zero() {
            return Duration::ZERO;
        }

        let mut last_dispatch = self.last_dispatch.lock().await;
        let arrived = Instant::now();

        if let Some(previous) = *last_dispatch {
            let ready_at = previous + self.min_interval;
            if ready_at > arrived {
                debug!(
                    wait = ?(ready_at - arrived),
                    "delaying dispatch to respect the provider rate limit"
                );
                sleep_until(ready_at).await;
            }
        }

        let granted = Instant::now();
        *last_dispatch = Some(granted);
        trace!("dispatch slot granted");

        granted - arrived
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_only_for_the_remaining_delta() {
        let limiter = RateLimiter::new(Duration::from_secs(1));

        limiter.acquire().await;
        tokio::time::advance(Duration::from_millis(700)).await;

        let waited = limiter.acquire().await;
        assert!(waited <= Duration::from_millis(300));
        assert!(waited >= Duration::from_millis(299));
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_after_the_interval_has_passed() {
        let limiter = RateLimiter::new(Duration::from_secs(1));

        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_serialized() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut grants = Vec::new();
        for handle in handles {
            grants.push(handle.await.unwrap());
        }
        grants.sort();

        assert!(grants[0] - start < Duration::from_millis(10));
        assert!(grants[1] - grants[0] >= Duration::from_secs(1));
        assert!(grants[2] - grants[1] >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_disables_pacing() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();

        for _ in 0..10 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
