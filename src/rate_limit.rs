//! Per-user sliding window rate limiter
//!
//! Each user gets `max_requests` within any `window`. Accepted requests are
//! remembered by timestamp; a denied request is not recorded. State is
//! in-process only and guarded by a `std::sync::Mutex` that is never held
//! across an await.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::Rng;
use uuid::Uuid;

use crate::config::RateLimitConfig;

/// Share of requests that also sweep expired users
const CLEANUP_PROBABILITY: f64 = 0.1;

/// Outcome of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window after this one
    pub remaining: usize,
    /// Wait until the oldest request leaves the window; zero when allowed
    pub retry_after: Duration,
}

pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    requests: Mutex<HashMap<Uuid, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            requests: Mutex::new(HashMap::new()),
        }
    }

    pub fn check_rate_limit(&self, user_id: Uuid) -> RateDecision {
        self.check_rate_limit_at(user_id, Instant::now())
    }

    pub fn check_rate_limit_at(&self, user_id: Uuid, now: Instant) -> RateDecision {
        let window = self.config.window;
        let max = self.config.max_requests;
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let stamps = requests.entry(user_id).or_default();

        while stamps
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= window)
        {
            stamps.pop_front();
        }

        if stamps.len() >= max {
            let retry_after = stamps
                .front()
                .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(window);
            tracing::debug!(%user_id, count = stamps.len(), "Rate limit exceeded");
            return RateDecision {
                allowed: false,
                remaining: 0,
                retry_after,
            };
        }

        stamps.push_back(now);
        RateDecision {
            allowed: true,
            remaining: max - stamps.len(),
            retry_after: Duration::ZERO,
        }
    }

    /// Drop users with no request inside the window. Returns how many were
    /// removed.
    pub fn cleanup_expired_entries(&self) -> usize {
        self.cleanup_expired_entries_at(Instant::now())
    }

    pub fn cleanup_expired_entries_at(&self, now: Instant) -> usize {
        let window = self.config.window;
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = requests.len();
        requests.retain(|_, stamps| {
            stamps
                .back()
                .is_some_and(|t| now.saturating_duration_since(*t) < window)
        });
        before - requests.len()
    }

    /// Tracked users, for diagnostics
    pub fn tracked_users(&self) -> usize {
        self.requests
            .lock()
            .map(|r| r.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    /// With probability 0.1, sweep expired users on a detached task
    pub fn maybe_spawn_cleanup(self: &Arc<Self>) {
        if rand::thread_rng().gen_bool(CLEANUP_PROBABILITY) {
            let limiter = Arc::clone(self);
            tokio::spawn(async move {
                let removed = limiter.cleanup_expired_entries();
                if removed > 0 {
                    tracing::debug!(removed, "Cleaned up rate limit entries");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: usize, secs: u64) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(RateLimitConfig {
            max_requests: max,
            window: Duration::from_secs(secs),
        })
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = limiter(3, 60);
        let user = Uuid::new_v4();
        let start = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let d = limiter.check_rate_limit_at(user, start);
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }
        let denied = limiter.check_rate_limit_at(user, start + Duration::from_secs(10));
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, Duration::from_secs(50));
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(2, 60);
        let user = Uuid::new_v4();
        let start = Instant::now();

        assert!(limiter.check_rate_limit_at(user, start).allowed);
        assert!(limiter.check_rate_limit_at(user, start + Duration::from_secs(30)).allowed);
        assert!(!limiter.check_rate_limit_at(user, start + Duration::from_secs(59)).allowed);
        // first request has left the window
        assert!(limiter.check_rate_limit_at(user, start + Duration::from_secs(60)).allowed);
    }

    #[test]
    fn test_users_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_rate_limit_at(Uuid::new_v4(), now).allowed);
        assert!(limiter.check_rate_limit_at(Uuid::new_v4(), now).allowed);
    }

    #[test]
    fn test_cleanup_removes_idle_users() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        limiter.check_rate_limit_at(Uuid::new_v4(), start);
        limiter.check_rate_limit_at(Uuid::new_v4(), start + Duration::from_secs(50));
        assert_eq!(limiter.tracked_users(), 2);

        let removed = limiter.cleanup_expired_entries_at(start + Duration::from_secs(70));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_users(), 1);
    }
}
